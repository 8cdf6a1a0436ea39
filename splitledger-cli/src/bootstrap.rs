use std::env;

use tracing_subscriber::EnvFilter;

const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_LOG_FILTER: &str = "info";

/// Settings read from the environment (and `.env`, when present)
pub struct AppConfig {
    pub currency: String,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self {
            currency: env_or("SPLITLEDGER_CURRENCY", DEFAULT_CURRENCY),
            log_filter: env_or("SPLITLEDGER_LOG", DEFAULT_LOG_FILTER),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

/// Initialize logging and tracing
///
/// Logs go to stderr so command output stays pipeable.
pub fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|err| {
        eprintln!("Ignoring invalid SPLITLEDGER_LOG '{}': {err}", config.log_filter);
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
