use serde::Deserialize;

/// Built-in nudge thresholds. Kept as named defaults so deployments can tune
/// them through env vars without touching the engine.
pub const DEFAULT_FIRST_COMMENT_AFTER_DAYS: i64 = 1;
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 2;
pub const DEFAULT_MAX_NOTIFICATIONS: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub nudge: NudgeConfig,
}

/// Tunables for the lead-nudge engine.
#[derive(Debug, Clone, Deserialize)]
pub struct NudgeConfig {
    /// Days after creation before a lead with no comments earns a reminder.
    pub first_comment_after_days: i64,
    /// Days of comment silence before a followed-up lead goes stale.
    pub stale_after_days: i64,
    /// Hard cap on notifications returned per request.
    pub max_notifications: usize,
    /// When true the engine filters the caller's dismissed notifications
    /// before capping. When false, filtering is left to the consumer.
    pub filter_dismissed: bool,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            first_comment_after_days: DEFAULT_FIRST_COMMENT_AFTER_DAYS,
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
            max_notifications: DEFAULT_MAX_NOTIFICATIONS,
            filter_dismissed: true,
        }
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let defaults = NudgeConfig::default();

    Ok(Config {
        port: std::env::var("LEADHUB_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .unwrap_or(8080),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/leadhub".into()),
        nudge: NudgeConfig {
            first_comment_after_days: std::env::var("LEADHUB_FIRST_COMMENT_AFTER_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.first_comment_after_days),
            stale_after_days: std::env::var("LEADHUB_STALE_AFTER_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.stale_after_days),
            max_notifications: std::env::var("LEADHUB_MAX_NOTIFICATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_notifications),
            filter_dismissed: std::env::var("LEADHUB_FILTER_DISMISSED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.filter_dismissed),
        },
    })
}
