//! Logging configuration.
//!
//! Supports configuration via:
//! - Environment variables (CP_LOG, RUST_LOG, CP_LOG_FORMAT)
//! - Explicit overrides from the embedding application

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

/// Environment variable selecting the log level.
pub const ENV_LOG_LEVEL: &str = "CP_LOG";
/// Environment variable selecting the log format.
pub const ENV_LOG_FORMAT: &str = "CP_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// Machine-parseable JSON lines.
    Jsonl,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = match s.trim().to_ascii_lowercase().as_str() {
            "human" | "console" | "pretty" => LogFormat::Human,
            "jsonl" | "json" | "structured" => LogFormat::Jsonl,
            other => return Err(format!("unknown log format: {}", other)),
        };
        Ok(format)
    }
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    /// Update cycles and phase changes (default).
    #[default]
    Info,
    /// Recovered training and classification failures.
    Warn,
    Error,
    /// Completely silent.
    Off,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "warning" => Ok(LogLevel::Warn),
            "none" | "quiet" => Ok(LogLevel::Off),
            name => LogLevel::VERBOSITY
                .into_iter()
                .chain([LogLevel::Off])
                .find(|level| level.as_str() == name)
                .ok_or_else(|| format!("unknown log level: {}", s)),
        }
    }
}

impl LogLevel {
    /// Levels that can appear in a `RUST_LOG` directive, most verbose first.
    const VERBOSITY: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Whether to include timestamps in human output.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment and explicit overrides.
    ///
    /// `CP_LOG` takes precedence over `RUST_LOG`; overrides win over both.
    pub fn from_env(level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        let mut config = LogConfig::default();

        if let Ok(val) = std::env::var(ENV_LOG_LEVEL) {
            if let Ok(parsed) = val.parse::<LogLevel>() {
                config.level = parsed;
            }
        } else if let Ok(val) = std::env::var("RUST_LOG") {
            config.level = level_from_rust_log(&val).unwrap_or(config.level);
        }

        if let Ok(val) = std::env::var(ENV_LOG_FORMAT) {
            if let Ok(parsed) = val.parse::<LogFormat>() {
                config.format = parsed;
            }
        }

        if let Some(level) = level {
            config.level = level;
        }
        if let Some(format) = format {
            config.format = format;
        }

        config
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }
}

/// Pick the most verbose level mentioned in a `RUST_LOG` directive string.
fn level_from_rust_log(directives: &str) -> Option<LogLevel> {
    let lower = directives.to_lowercase();
    LogLevel::VERBOSITY
        .into_iter()
        .find(|level| lower.contains(level.as_str()))
}
