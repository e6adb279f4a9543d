use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// X API bearer token. Absent means the fixture feed is used.
    pub x_bearer_token: Option<String>,
    /// Platform handle that mentions must address (without the `@`).
    pub mention_handle: String,
    /// Minutes between ingestion runs.
    pub poll_interval_minutes: u64,
    /// Per-call timeout for mention feed fetches.
    pub fetch_timeout: Duration,
    /// Per-call timeout for chain adapter calls.
    pub chain_timeout: Duration,
    /// Mention page size requested per poll.
    pub page_size: u32,
    /// Seed demo identities and artifacts at startup.
    pub seed_fixtures: bool,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if a var is present but malformed.
    pub fn from_env() -> Self {
        Self {
            x_bearer_token: env::var("X_BEARER_TOKEN").ok().filter(|t| !t.is_empty()),
            mention_handle: env::var("MENTION_HANDLE")
                .unwrap_or_else(|_| "mintloom_xyz".to_string()),
            poll_interval_minutes: parsed_env("POLL_INTERVAL_MINUTES", 5),
            fetch_timeout: Duration::from_secs(parsed_env("FETCH_TIMEOUT_SECS", 30)),
            chain_timeout: Duration::from_secs(parsed_env("CHAIN_TIMEOUT_SECS", 30)),
            page_size: parsed_env("PAGE_SIZE", 10),
            seed_fixtures: env::var("SEED_FIXTURES")
                .map(|v| v != "0" && v != "false")
                .unwrap_or(true),
        }
    }

    /// Log the effective configuration without secret material.
    pub fn log_redacted(&self) {
        tracing::info!(
            live_feed = self.x_bearer_token.is_some(),
            handle = self.mention_handle.as_str(),
            poll_interval_minutes = self.poll_interval_minutes,
            page_size = self.page_size,
            seed_fixtures = self.seed_fixtures,
            "Configuration loaded"
        );
    }
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number, got: {raw}")),
        Err(_) => default,
    }
}
