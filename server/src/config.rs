use std::{env, path::PathBuf};

use crate::error::ConfigErr;

pub const DEFAULT_MODEL_PATH: &str = "models/model.pkl";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    model_path: PathBuf,
    host: String,
    port: u16,
    preload: bool,
}

impl ServiceConfig {
    /// Reads `MODEL_PATH`, `HOST`, `PORT` and `PRELOAD_MODEL` from the process environment.
    ///
    /// # Errors
    /// Returns a `ConfigErr` if `PORT` or `PRELOAD_MODEL` are set to something unparsable.
    pub fn from_env() -> Result<Self, ConfigErr> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` but reading from an arbitrary source.
    ///
    /// Unset and empty variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigErr>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let model_path = var("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match var("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigErr::InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };

        let preload = match var("PRELOAD_MODEL") {
            Some(value) => parse_flag("PRELOAD_MODEL", value)?,
            None => false,
        };

        Ok(Self {
            model_path,
            host,
            port,
            preload,
        })
    }

    pub fn model_path(&self) -> &PathBuf {
        &self.model_path
    }

    /// Whether the model should be loaded before accepting connections.
    pub fn preload(&self) -> bool {
        self.preload
    }

    /// Returns the `host:port` address to listen at.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigErr> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigErr::InvalidFlag { key, value }),
    }
}
