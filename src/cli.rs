use clap::{Parser, Subcommand};

/// LeadHub — internal CRM backend
#[derive(Parser)]
#[command(name = "leadhub", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// ADMIN or USER
        #[arg(long, default_value = "USER")]
        role: String,
    },
    /// List users
    List,
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Issue a session token for a user (printed once, stored hashed)
    Issue {
        #[arg(long)]
        email: String,
        /// Days until the session expires
        #[arg(long, default_value = "30")]
        ttl_days: i64,
    },
}
