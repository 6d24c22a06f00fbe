use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::db::RetryPolicy;

const DEFAULT_DB_PATH: &str = "data/visits.db";
const DEFAULT_CONNECT_DELAY_MS: u64 = 1000;

/// Runtime settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub connect_attempts: u32,
    pub connect_delay: Duration,
    pub bind_addr: SocketAddr,
    pub recent_limit: u32,
    pub seed_messages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: format!("sqlite:{DEFAULT_DB_PATH}"),
            max_connections: 5,
            connect_attempts: 10,
            connect_delay: Duration::from_millis(DEFAULT_CONNECT_DELAY_MS),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            recent_limit: 10,
            seed_messages: Vec::new(),
        }
    }
}

impl Config {
    /// Build the configuration from process environment (after loading `.env`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup; missing or
    /// unparsable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| {
            let path = lookup("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
            format!("sqlite:{path}")
        });

        let connect_delay = parse_or("DB_CONNECT_DELAY_MS", &lookup, DEFAULT_CONNECT_DELAY_MS);

        let seed_messages = lookup("SEED_MESSAGES")
            .map(|raw| {
                raw.split('|')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            database_url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", &lookup, defaults.max_connections),
            connect_attempts: parse_or("DB_CONNECT_ATTEMPTS", &lookup, defaults.connect_attempts),
            connect_delay: Duration::from_millis(connect_delay),
            bind_addr: parse_or("BIND_ADDR", &lookup, defaults.bind_addr),
            recent_limit: parse_or("RECENT_LIMIT", &lookup, defaults.recent_limit),
            seed_messages,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.connect_attempts,
            delay: self.connect_delay,
        }
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting, using default");
            default
        }),
        None => default,
    }
}
