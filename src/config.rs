use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::cache::DEFAULT_TTL;
use crate::upstream::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
    /// Language used when a transcript request does not name one.
    pub default_language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cache_ttl: DEFAULT_TTL,
            retry: RetryPolicy::default(),
            default_language: "th".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; invalid values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let ttl_secs = parse_or(&lookup, "TTL", DEFAULT_TTL.as_secs());
        let retry_delay_secs = parse_or(&lookup, "RETRY_DELAY", DEFAULT_RETRY_DELAY.as_secs_f64());
        let retry_delay = Duration::try_from_secs_f64(retry_delay_secs).unwrap_or_else(|_| {
            warn!("RETRY_DELAY must be a non-negative number of seconds, using default");
            DEFAULT_RETRY_DELAY
        });
        let max_retries = parse_or(&lookup, "MAX_RETRIES", DEFAULT_MAX_ATTEMPTS);

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            cache_ttl: Duration::from_secs(ttl_secs),
            retry: RetryPolicy::new(max_retries, retry_delay),
            default_language: lookup("DEFAULT_LANGUAGE")
                .map(|lang| lang.trim().to_string())
                .filter(|lang| !lang.is_empty())
                .unwrap_or(defaults.default_language),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {}={:?}, using default {:?}", key, raw, default);
            default
        }),
        None => default,
    }
}
