use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use rand::RngCore;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod config;
mod currency;
mod errors;
mod models;
mod nudge;
mod store;

use models::user::Role;
use store::postgres::PgStore;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub db: PgStore,
    pub config: config::Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "leadhub=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::User { command }) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            db.migrate().await?;
            handle_user_command(&db, command).await
        }
        Some(cli::Commands::Session { command }) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            db.migrate().await?;
            handle_session_command(&db, command).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let state = Arc::new(AppState { db, config: cfg });

    let app = axum::Router::new()
        .route("/healthz", axum::routing::get(|| async { "ok" }))
        .nest("/api", api::api_router(state))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("LeadHub listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_user_command(db: &PgStore, cmd: cli::UserCommands) -> anyhow::Result<()> {
    match cmd {
        cli::UserCommands::Add { email, name, role } => {
            let role = Role::from_str(&role);
            let id = db.insert_user(&email, &name, role).await?;
            println!("Created user {} ({}) with role {}", id, email, role.as_str());
        }
        cli::UserCommands::List => {
            for u in db.list_users().await? {
                println!("{}  {:<8} {}  {}", u.id, u.role, u.email, u.name);
            }
        }
    }
    Ok(())
}

async fn handle_session_command(db: &PgStore, cmd: cli::SessionCommands) -> anyhow::Result<()> {
    match cmd {
        cli::SessionCommands::Issue { email, ttl_days } => {
            let user = db
                .get_user_by_email(&email)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no user with email {}", email))?;

            let mut bytes = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut bytes);
            let token = hex::encode(bytes);

            db.insert_session(&api::hash_session_token(&token), user.id, ttl_days)
                .await?;

            // The raw token is shown exactly once; only its hash is stored.
            println!("Session token for {} (expires in {} days):", email, ttl_days);
            println!("{}", token);
        }
    }
    Ok(())
}
