// src/config.rs
use anyhow::{Context, Result};
use log::warn;
use std::env;
use std::path::PathBuf;

use crate::services::spreadsheet::{DealSource, DEFAULT_DEALS_URL};

const DEFAULT_PORT: u16 = 3030;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub source: DealSource,
}

impl Config {
    /// Read the configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a number, got '{}'", port))?,
            None => {
                warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let source = match (non_empty("DEALS_PATH"), non_empty("DEALS_URL")) {
            (Some(path), _) => DealSource::Path(PathBuf::from(path)),
            (None, Some(url)) => DealSource::Url(url),
            (None, None) => DealSource::Url(DEFAULT_DEALS_URL.to_string()),
        };

        Ok(Config { port, source })
    }
}
