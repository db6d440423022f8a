//! Report configuration: calendar time zone and output caps.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const CONFIG_ENV_KEY: &str = "CHAT_RECAP_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecapConfig {
    #[serde(default)]
    pub timezone: ReportTimezone,
    /// Number of trailing active days averaged for the "latest" reply length.
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,
    #[serde(default = "default_word_cloud_limit")]
    pub word_cloud_limit: usize,
    #[serde(default = "default_topic_limit")]
    pub topic_limit: usize,
    /// Maximum points kept in the assistant reply-length trend chart.
    #[serde(default = "default_trend_sample_limit")]
    pub trend_sample_limit: usize,
}

impl Default for RecapConfig {
    fn default() -> Self {
        Self {
            timezone: ReportTimezone::default(),
            rolling_window: default_rolling_window(),
            word_cloud_limit: default_word_cloud_limit(),
            topic_limit: default_topic_limit(),
            trend_sample_limit: default_trend_sample_limit(),
        }
    }
}

impl RecapConfig {
    pub fn with_timezone(mut self, timezone: ReportTimezone) -> Self {
        self.timezone = timezone;
        self
    }
}

fn default_rolling_window() -> usize {
    30
}

fn default_word_cloud_limit() -> usize {
    120
}

fn default_topic_limit() -> usize {
    5
}

fn default_trend_sample_limit() -> usize {
    90
}

/// The zone every calendar bucket (day, month, hour, weekday) is computed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportTimezone {
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl ReportTimezone {
    /// Wall-clock time of `instant` in this zone.
    pub fn localize(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Local => instant.with_timezone(&Local).naive_local(),
            Self::Utc => instant.naive_utc(),
            Self::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }
}

impl FromStr for ReportTimezone {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
            return Ok(Self::Utc);
        }

        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(anyhow!("unrecognised timezone `{trimmed}`")),
        };
        let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
        let hours: u8 = hours
            .parse()
            .with_context(|| format!("invalid hour offset in `{trimmed}`"))?;
        let minutes: u8 = minutes
            .parse()
            .with_context(|| format!("invalid minute offset in `{trimmed}`"))?;
        if hours > 23 {
            return Err(anyhow!("hour offset out of range in `{trimmed}`"));
        }
        if minutes > 59 {
            return Err(anyhow!("minute offset out of range in `{trimmed}`"));
        }
        FixedOffset::east_opt(sign * (i32::from(hours) * 3600 + i32::from(minutes) * 60))
            .map(Self::Fixed)
            .ok_or_else(|| anyhow!("offset out of range in `{trimmed}`"))
    }
}

impl fmt::Display for ReportTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Utc => f.write_str("utc"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl<'de> Deserialize<'de> for ReportTimezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn home_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("chat-recap")
            .join("config.toml")
    })
}

/// Pick the config file to read: explicit flag, then environment, then the home default.
pub fn resolve_config_path(raw_path: Option<PathBuf>) -> Option<PathBuf> {
    if raw_path.is_some() {
        return raw_path;
    }

    if let Ok(value) = std::env::var(CONFIG_ENV_KEY) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    home_config_path().filter(|path| path.is_file())
}

pub fn load_config(path: impl AsRef<Path>) -> Result<RecapConfig> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read config {}", path.as_ref().display()))?;
    toml::from_str(&content).context("failed to parse TOML config")
}

/// Load the resolved config file, or fall back to defaults when none exists.
pub fn load_config_or_default(raw_path: Option<PathBuf>) -> Result<RecapConfig> {
    match resolve_config_path(raw_path) {
        Some(path) => load_config(path),
        None => Ok(RecapConfig::default()),
    }
}
