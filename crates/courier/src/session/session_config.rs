use std::path::Path;

use jiff::{SignedDuration, SpanRelativeTo};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    render::color::{Palette, PaletteError},
    solver::engine::{Algorithm, UnknownAlgorithm},
};

pub const TIME_LIMIT_VAR: &str = "COURIER_TIME_LIMIT";
pub const ALGORITHM_VAR: &str = "COURIER_ALGORITHM";
pub const PALETTE_VAR: &str = "COURIER_PALETTE";

const DEFAULT_TIME_LIMIT: SignedDuration = SignedDuration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid duration `{0}`, expected e.g. `30`, `30s` or `PT1M`")]
    InvalidDuration(String),

    #[error(transparent)]
    Algorithm(#[from] UnknownAlgorithm),

    #[error(transparent)]
    Palette(#[from] PaletteError),
}

/// Accepts plain seconds (`30`), friendly durations (`30s`, `1m 30s`) and
/// ISO 8601 (`PT1M`). Negative values are taken as their magnitude.
pub fn parse_duration(input: &str) -> Result<SignedDuration, ConfigError> {
    let input = input.trim();

    let invalid = || ConfigError::InvalidDuration(input.to_string());

    if let Ok(seconds) = input.parse::<i64>() {
        return seconds
            .checked_abs()
            .map(SignedDuration::from_secs)
            .ok_or_else(invalid);
    }

    if let Ok(duration) = input.parse::<SignedDuration>() {
        return magnitude(duration).ok_or_else(invalid);
    }

    if let Ok(duration) = input
        .parse::<jiff::Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        return magnitude(duration).ok_or_else(invalid);
    }

    Err(invalid())
}

/// `None` for `SignedDuration::MIN`, which has no positive counterpart.
fn magnitude(duration: SignedDuration) -> Option<SignedDuration> {
    if duration.is_negative() {
        duration.checked_neg()
    } else {
        Some(duration)
    }
}

fn deserialize_time_limit<'de, D>(deserializer: D) -> Result<SignedDuration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Seconds(u64),
        Text(String),
    }

    match RawDuration::deserialize(deserializer)? {
        RawDuration::Seconds(seconds) => i64::try_from(seconds)
            .map(SignedDuration::from_secs)
            .map_err(serde::de::Error::custom),
        RawDuration::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}

/// Settings of one interactive run. Loaded from JSON, then overridden by
/// the environment, then by command line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    #[serde(deserialize_with = "deserialize_time_limit")]
    pub time_limit: SignedDuration,
    pub algorithm: Algorithm,
    pub palette: Palette,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            algorithm: Algorithm::default(),
            palette: Palette::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Applies the `COURIER_*` variables of the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(TIME_LIMIT_VAR) {
            self.time_limit = parse_duration(&value)?;
            debug!(time_limit = %self.time_limit, "time limit from environment");
        }
        if let Some(value) = lookup(ALGORITHM_VAR) {
            self.algorithm = value.parse()?;
            debug!(algorithm = %self.algorithm, "algorithm from environment");
        }
        if let Some(value) = lookup(PALETTE_VAR) {
            self.palette = Palette::parse_list(&value)?;
            debug!(colors = self.palette.len(), "palette from environment");
        }

        Ok(())
    }

    /// Whole seconds of the time limit, the number of progress ticks.
    pub fn time_limit_secs(&self) -> u64 {
        self.time_limit.as_secs().unsigned_abs()
    }
}
