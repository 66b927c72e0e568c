//! Session configuration.
//!
//! # Responsibility
//! - Hold the user-editable settings read by all three rotators.
//! - Parse `datetime-local` style target input in the host's time zone.
//! - Apply environment overrides for headless hosts.
//!
//! # Invariants
//! - `greeting_interval_ms` is always > 0 after `validate()`.
//! - Target instants are Unix epoch milliseconds.

use crate::model::theme::BACKGROUND_PRESETS;
use chrono::{Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default countdown target, interpreted in local time.
pub const DEFAULT_TARGET_DATE: &str = "2026-01-01T00:00:00";
/// Default greeting rotation period.
pub const DEFAULT_GREETING_INTERVAL_MS: u64 = 8_000;
/// Countdown refresh period.
pub const COUNTDOWN_TICK_MS: u64 = 1_000;
/// Photo autoplay period.
pub const PHOTO_ROTATION_MS: u64 = 5_000;

/// Env var overriding the countdown target (`YYYY-MM-DDTHH:MM[:SS]`).
pub const ENV_TARGET_DATE: &str = "WATA_TARGET_DATE";
/// Env var overriding the greeting rotation period in milliseconds.
pub const ENV_GREETING_INTERVAL_MS: &str = "WATA_GREETING_INTERVAL_MS";
/// Env var toggling photo autoplay (`true|false|1|0|on|off`).
pub const ENV_AUTOPLAY_PHOTOS: &str = "WATA_AUTOPLAY_PHOTOS";

const ACCEPTED_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroGreetingInterval,
    InvalidDateTime(String),
    NonexistentLocalTime(String),
    BackgroundIndexOutOfRange { index: usize, available: usize },
    InvalidEnvValue { name: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroGreetingInterval => write!(f, "greeting interval must be greater than zero"),
            Self::InvalidDateTime(value) => {
                write!(f, "invalid target date `{value}`; expected YYYY-MM-DDTHH:MM[:SS]")
            }
            Self::NonexistentLocalTime(value) => {
                write!(f, "target date `{value}` does not exist in the local time zone")
            }
            Self::BackgroundIndexOutOfRange { index, available } => write!(
                f,
                "background preset {index} is out of range (available: {available})"
            ),
            Self::InvalidEnvValue { name, value } => {
                write!(f, "environment variable {name} has invalid value `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// User-editable session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Countdown target in Unix epoch milliseconds.
    pub target_epoch_ms: i64,
    pub greeting_interval_ms: u64,
    pub autoplay_photos: bool,
    pub background_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // Falls back to the UTC reading only if the local zone skips
            // midnight on new year's day.
            target_epoch_ms: parse_local_datetime(DEFAULT_TARGET_DATE)
                .unwrap_or(1_767_225_600_000),
            greeting_interval_ms: DEFAULT_GREETING_INTERVAL_MS,
            autoplay_photos: true,
            background_url: BACKGROUND_PRESETS[0].to_string(),
        }
    }
}

impl SessionConfig {
    /// Checks setting-level invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.greeting_interval_ms == 0 {
            return Err(ConfigError::ZeroGreetingInterval);
        }
        Ok(())
    }

    /// Builds defaults with `WATA_*` environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = read_env(ENV_TARGET_DATE) {
            config.target_epoch_ms = parse_local_datetime(&raw)?;
        }
        if let Some(raw) = read_env(ENV_GREETING_INTERVAL_MS) {
            config.greeting_interval_ms =
                raw.parse::<u64>()
                    .map_err(|_| ConfigError::InvalidEnvValue {
                        name: ENV_GREETING_INTERVAL_MS,
                        value: raw.clone(),
                    })?;
        }
        if let Some(raw) = read_env(ENV_AUTOPLAY_PHOTOS) {
            config.autoplay_photos =
                parse_flag(&raw).ok_or_else(|| ConfigError::InvalidEnvValue {
                    name: ENV_AUTOPLAY_PHOTOS,
                    value: raw.clone(),
                })?;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Resolves one background preset url by index.
pub fn background_preset(index: usize) -> Result<&'static str, ConfigError> {
    BACKGROUND_PRESETS
        .get(index)
        .copied()
        .ok_or(ConfigError::BackgroundIndexOutOfRange {
            index,
            available: BACKGROUND_PRESETS.len(),
        })
}

/// Parses `YYYY-MM-DDTHH:MM[:SS]` in the local time zone into epoch millis.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant.
pub fn parse_local_datetime(value: &str) -> Result<i64, ConfigError> {
    let trimmed = value.trim();
    let naive = ACCEPTED_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| ConfigError::InvalidDateTime(trimmed.to_string()))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|instant| instant.timestamp_millis())
        .ok_or_else(|| ConfigError::NonexistentLocalTime(trimmed.to_string()))
}

/// Formats epoch millis back into the `datetime-local` shape.
pub fn format_local_datetime(epoch_ms: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(epoch_ms)
        .single()
        .map(|instant| instant.format(ACCEPTED_DATETIME_FORMATS[0]).to_string())
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
