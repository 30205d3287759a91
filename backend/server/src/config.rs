use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

use crate::error::ServerError;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

impl Config {
    pub fn load() -> Result<Self, ServerError> {
        Ok(Self {
            host: try_load("RUST_HOST", "0.0.0.0")?,
            port: try_load("RUST_PORT", "3000")?,
            static_dir: try_load("STATIC_DIR", "public")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: "public".to_string(),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, ServerError>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");

            ServerError::Config {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })
}
