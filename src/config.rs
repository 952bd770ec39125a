//! Configuration module for infobot.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::{InfobotError, Result};

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Nick used until the first tally is published.
    #[serde(default = "default_nick")]
    pub nick: String,
    /// Path to the cookie file handed to the transport.
    #[serde(default)]
    pub cookie_file: Option<String>,
}

fn default_nick() -> String {
    "InfoBot".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            nick: default_nick(),
            cookie_file: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Everything a transport needs to connect to one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSettings {
    /// Room name.
    pub name: String,
    /// Room password, if the room has one.
    pub password: Option<String>,
    /// Cookie file shared by every room connection.
    pub cookie_file: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Bot identity.
    #[serde(default)]
    pub bot: BotConfig,
    /// Rooms to join, mapped to their password (empty for none).
    #[serde(default)]
    pub rooms: BTreeMap<String, String>,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(InfobotError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| InfobotError::Config(format!("config parse error: {e}")))
    }

    /// Rooms with their optional password, sorted by room name.
    pub fn rooms(&self) -> Vec<(String, Option<String>)> {
        self.rooms
            .iter()
            .map(|(name, password)| {
                let password = if password.is_empty() {
                    None
                } else {
                    Some(password.clone())
                };
                (name.clone(), password)
            })
            .collect()
    }

    /// Connection settings for each configured room, sorted by room name.
    pub fn room_settings(&self) -> Vec<RoomSettings> {
        self.rooms()
            .into_iter()
            .map(|(name, password)| RoomSettings {
                name,
                password,
                cookie_file: self.bot.cookie_file.clone(),
            })
            .collect()
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The bot nick is empty
    /// - A room name is empty or contains whitespace
    pub fn validate(&self) -> Result<()> {
        if self.bot.nick.trim().is_empty() {
            return Err(InfobotError::Validation(
                "bot.nick must not be empty".to_string(),
            ));
        }
        for name in self.rooms.keys() {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(InfobotError::Validation(format!(
                    "invalid room name {name:?}"
                )));
            }
        }
        Ok(())
    }
}
