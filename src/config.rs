use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::data::Weekday;
use crate::materializer::SlotConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub data_file: Option<PathBuf>,
    pub slot: SlotConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = lookup("ROOM_ALLOC_LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .context("ROOM_ALLOC_LISTEN_ADDR is not a socket address")?;

        let log_level = lookup("ROOM_ALLOC_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let data_file = lookup("ROOM_ALLOC_DATA_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let days = lookup("ROOM_ALLOC_SLOT_DAYS").unwrap_or_else(|| "1,2,3".to_string());
        let days = parse_days(&days)?;
        let start = lookup("ROOM_ALLOC_SLOT_START").unwrap_or_else(|| "19:00".to_string());
        let end = lookup("ROOM_ALLOC_SLOT_END").unwrap_or_else(|| "22:00".to_string());
        let slot = SlotConfig::parse(days, &start, &end)?;

        Ok(Self {
            listen_addr,
            log_level,
            data_file,
            slot,
        })
    }
}

fn parse_days(raw: &str) -> Result<Vec<Weekday>> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| {
            d.parse::<Weekday>()
                .with_context(|| format!("weekday '{}' is not a number", d))
        })
        .collect()
}
