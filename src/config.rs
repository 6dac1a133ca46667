// src/config.rs

use std::env;

use crate::{error::ConfigError, models::settings::ExamSettings};

/// Seconds between two countdown ticks of a running session.
pub const TICK_INTERVAL_SECS: u64 = 1;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub rust_log: String,
    /// Used for any setting the administrator has not stored yet.
    pub default_settings: ExamSettings,
}

impl Config {
    /// Reads the configuration from the process environment.
    /// Expects `.env` to have been loaded by the caller already.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://exam.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let default_settings = ExamSettings {
            shuffle_questions: flag(
                "DEFAULT_SHUFFLE_QUESTIONS",
                env::var("DEFAULT_SHUFFLE_QUESTIONS").ok(),
                true,
            )?,
            show_scores: flag(
                "DEFAULT_SHOW_SCORES",
                env::var("DEFAULT_SHOW_SCORES").ok(),
                true,
            )?,
        };

        Ok(Self {
            database_url,
            bind_addr,
            rust_log,
            default_settings,
        })
    }
}

/// Parses an optional boolean setting; unset means `default`.
fn flag(name: &str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name: name.to_string(),
            value: raw,
        }),
    }
}
