//! Hub configuration, read once at startup from the environment.
//!
//! Every knob has a default so the hub starts with no environment at all.
//! Unparsable values fall back to the default; values that would make the hub
//! unable to run (zero-capacity queues) are rejected.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_MODERATION_LIST_PATH: &str = "moderation.json";
const DEFAULT_PUBLIC_DIR: &str = "public";
const DEFAULT_CLIENT_QUEUE_CAPACITY: usize = 256;
const DEFAULT_HUB_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be greater than zero")]
    ZeroCapacity { key: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Initial listener port. May later move via `PUT /api/port`.
    pub port: u16,
    pub bind_addr: IpAddr,
    /// Where the moderation list is persisted.
    pub moderation_list_path: PathBuf,
    /// Static audience page served at `/`.
    pub public_dir: PathBuf,
    /// Outbound frames buffered per connection before frames are dropped.
    pub client_queue_capacity: usize,
    /// Commands buffered in front of the hub task.
    pub hub_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: DEFAULT_BIND_ADDR,
            moderation_list_path: PathBuf::from(DEFAULT_MODERATION_LIST_PATH),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            client_queue_capacity: DEFAULT_CLIENT_QUEUE_CAPACITY,
            hub_queue_capacity: DEFAULT_HUB_QUEUE_CAPACITY,
        }
    }
}

impl Config {
    /// Load from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if either queue capacity is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            port: env_parse("PORT", DEFAULT_PORT),
            bind_addr: env_parse("BIND_ADDR", DEFAULT_BIND_ADDR),
            moderation_list_path: env_path("MODERATION_LIST_PATH", DEFAULT_MODERATION_LIST_PATH),
            public_dir: env_path("PUBLIC_DIR", DEFAULT_PUBLIC_DIR),
            client_queue_capacity: env_parse("CLIENT_QUEUE_CAPACITY", DEFAULT_CLIENT_QUEUE_CAPACITY),
            hub_queue_capacity: env_parse("HUB_QUEUE_CAPACITY", DEFAULT_HUB_QUEUE_CAPACITY),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.client_queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { key: "CLIENT_QUEUE_CAPACITY" });
        }
        if self.hub_queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { key: "HUB_QUEUE_CAPACITY" });
        }
        Ok(())
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| PathBuf::from(default), PathBuf::from)
}
