//! Structured event definitions for logging.
//!
//! Events follow a consistent schema for machine-parseable JSONL output.
//! All events carry the run correlation ID, an optional stream ID and the
//! pipeline stage that produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Stages of the patching pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Construction and configuration.
    Init,
    /// Buffering incoming records into batches.
    Ingest,
    /// Rebuilding the base predictor before patching starts.
    Bootstrap,
    /// Relabelling the merged window into wrong/right.
    Redefine,
    /// Training the region decider.
    Region,
    /// Splitting errors into per-region subsets.
    Partition,
    /// Training the patch predictors.
    Patch,
    /// Routing a record to a predictor.
    Classify,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Ingest => "ingest",
            Stage::Bootstrap => "bootstrap",
            Stage::Redefine => "redefine",
            Stage::Region => "region",
            Stage::Partition => "partition",
            Stage::Patch => "patch",
            Stage::Classify => "classify",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Lifecycle
    pub const CLASSIFIER_CREATED: &str = "classifier.created";
    pub const CLASSIFIER_RESET: &str = "classifier.reset";
    pub const PATCHING_ENABLED: &str = "phase.patching_enabled";

    // Ingest
    pub const BATCH_FLUSHED: &str = "ingest.batch_flushed";
    pub const RECORD_REJECTED: &str = "ingest.record_rejected";

    // Bootstrap
    pub const BASE_REBUILT: &str = "bootstrap.base_rebuilt";
    pub const BASE_BUILD_FAILED: &str = "bootstrap.base_failed";
    pub const BASE_MISSING: &str = "bootstrap.base_missing";

    // Update cycle
    pub const UPDATE_STARTED: &str = "update.started";
    pub const UPDATE_FINISHED: &str = "update.finished";
    pub const REDEFINE_FINISHED: &str = "redefine.finished";
    pub const DECIDER_BUILT: &str = "region.decider_built";
    pub const DECIDER_FAILED: &str = "region.decider_failed";
    pub const PARTITION_FINISHED: &str = "partition.finished";
    pub const PATCH_TRAINED: &str = "patch.trained";
    pub const PATCH_SKIPPED: &str = "patch.skipped";
    pub const PATCH_FAILED: &str = "patch.failed";

    // Classification
    pub const CLASSIFY_FALLBACK: &str = "classify.fallback";
}

/// A structured log event for JSONL output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub ts: DateTime<Utc>,
    pub level: Level,

    /// Event name (e.g., "update.started", "patch.trained").
    pub event: String,

    /// Unique ID of the classifier instance that emitted the event.
    pub run_id: String,

    /// Caller-supplied stream label, when one was set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,

    pub stage: Stage,
    pub message: String,

    /// Additional structured fields (stable keys).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, serde_json::Value>,

    /// Update cycle the event belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<u64>,
}

impl LogEvent {
    pub fn new(
        level: Level,
        event: impl Into<String>,
        run_id: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> Self {
        LogEvent {
            ts: Utc::now(),
            level,
            event: event.into(),
            run_id: run_id.into(),
            stream_id: None,
            stage,
            message: message.into(),
            fields: HashMap::new(),
            update: None,
        }
    }

    pub fn with_stream_id(mut self, stream_id: impl Into<String>) -> Self {
        self.stream_id = Some(stream_id.into());
        self
    }

    /// Add a field to the event.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
        self
    }

    pub fn with_update(mut self, update: u64) -> Self {
        self.update = Some(update);
        self
    }

    /// Serialize to a single JSON line.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","event":"{}"}}"#,
                self.event
            )
        })
    }
}

/// Correlation IDs shared by every event of one classifier.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub stream_id: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            stream_id: None,
        }
    }

    pub fn with_stream_id(mut self, stream_id: impl Into<String>) -> Self {
        self.stream_id = Some(stream_id.into());
        self
    }

    /// Create an event with this context.
    pub fn event(
        &self,
        level: Level,
        event: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> LogEvent {
        let mut e = LogEvent::new(level, event, &self.run_id, stage, message);
        e.stream_id.clone_from(&self.stream_id);
        e
    }

    pub fn info(
        &self,
        event: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> LogEvent {
        self.event(Level::Info, event, stage, message)
    }

    pub fn warn(
        &self,
        event: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> LogEvent {
        self.event(Level::Warn, event, stage, message)
    }
}

impl Default for LogContext {
    fn default() -> Self {
        LogContext::new(super::generate_run_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_serialization() {
        let event = LogEvent::new(
            Level::Info,
            event_names::UPDATE_STARTED,
            "run-12345",
            Stage::Redefine,
            "Update cycle started",
        )
        .with_stream_id("sensor-7")
        .with_update(3)
        .with_field("merged_records", 1200);

        let json = event.to_jsonl();
        assert!(json.contains(r#""event":"update.started""#));
        assert!(json.contains(r#""level":"info""#));
        assert!(json.contains(r#""stage":"redefine""#));
        assert!(json.contains(r#""stream_id":"sensor-7""#));
        assert!(json.contains(r#""update":3"#));
        assert!(json.contains(r#""merged_records":1200"#));
    }

    #[test]
    fn test_optional_fields_omitted() {
        let json = LogEvent::new(Level::Warn, "x", "run-1", Stage::Patch, "m").to_jsonl();
        assert!(!json.contains("stream_id"));
        assert!(!json.contains("fields"));
        assert!(!json.contains("update"));
    }

    #[test]
    fn test_log_context_propagates_ids() {
        let ctx = LogContext::new("run-abc").with_stream_id("orders");
        let event = ctx.warn(event_names::PATCH_FAILED, Stage::Patch, "patch 2 failed");
        assert_eq!(event.run_id, "run-abc");
        assert_eq!(event.stream_id.as_deref(), Some("orders"));
        assert_eq!(event.level, Level::Warn);
    }

    #[test]
    fn test_stage_display_matches_serde() {
        for stage in [Stage::Init, Stage::Partition, Stage::Classify] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
        }
    }
}
