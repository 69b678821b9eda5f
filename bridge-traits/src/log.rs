//! Logging Abstractions
//!
//! Log entries mirrored from the authentication core into the host's own
//! logging pipeline.
//!
//! Every login or logout runs under a correlation id that is also sent to
//! the identity provider. [`LogEntry::correlation_id`] carries it so host
//! logs can be joined with provider-side diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{error::Result, platform::PlatformSendSync};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// One log record forwarded to a [`LoggerSink`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Emitting module, e.g. `core_auth::orchestrator`
    pub target: String,
    pub message: String,
    /// Remaining structured fields, already redacted by the forwarding layer
    pub fields: HashMap<String, String>,
    /// Correlation id of the login or logout the entry belongs to
    pub correlation_id: Option<String>,
    /// Name of the innermost span, e.g. `acquire_validated`
    pub span: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: HashMap::new(),
            correlation_id: None,
            span: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}

/// Host-side receiver for core log entries.
///
/// Web hosts typically forward to the console or the plugin bridge; desktop
/// hosts to a file or the system log. Entries arrive with token-bearing
/// fields already redacted when PII redaction is enabled.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::log::{LoggerSink, LogEntry, LogLevel};
///
/// async fn report(logger: &dyn LoggerSink, correlation_id: &str) {
///     let entry = LogEntry::new(LogLevel::Error, "core_auth", "Login failed")
///         .with_correlation_id(correlation_id)
///         .with_field("operation", "login");
///     logger.log(entry).await.ok();
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LoggerSink: PlatformSendSync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Entries below this level are dropped before they are built.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Prints entries to stdout; for development hosts and demos.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    pub min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }
}

impl ConsoleLogger {
    fn format(entry: &LogEntry) -> String {
        let mut line = format!(
            "[{}] {} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.level.as_str(),
            entry.target
        );
        if let Some(correlation_id) = &entry.correlation_id {
            line.push_str(&format!(" [{}]", correlation_id));
        }
        line.push_str(&format!(": {}", entry.message));
        line
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl LoggerSink for ConsoleLogger {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level < self.min_level {
            return Ok(());
        }

        println!("{}", Self::format(&entry));
        if !entry.fields.is_empty() {
            println!("  Fields: {:?}", entry.fields);
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_builder() {
        let entry = LogEntry::new(LogLevel::Warn, "core_auth", "Silent acquisition failed")
            .with_correlation_id("2f1c")
            .with_field("kind", "interaction_required");

        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.target, "core_auth");
        assert_eq!(entry.correlation_id.as_deref(), Some("2f1c"));
        assert_eq!(
            entry.fields.get("kind").map(String::as_str),
            Some("interaction_required")
        );
        assert!(entry.span.is_none());
    }

    #[test]
    fn test_log_entry_serializes_camel_case() {
        let entry =
            LogEntry::new(LogLevel::Info, "core_auth", "Signed in").with_correlation_id("2f1c");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["correlationId"], "2f1c");
        assert_eq!(json["level"], "Info");
    }

    #[test]
    fn test_console_format_includes_correlation_id() {
        let entry = LogEntry::new(LogLevel::Error, "core_auth", "Login failed");
        assert!(ConsoleLogger::format(&entry).contains("ERROR core_auth: Login failed"));

        let line = ConsoleLogger::format(&entry.with_correlation_id("2f1c"));
        assert!(line.contains("ERROR core_auth [2f1c]: Login failed"));
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(ConsoleLogger::default().min_level(), LogLevel::Info);
    }

    #[tokio::test]
    async fn test_console_logger() {
        let logger = ConsoleLogger::default();
        let entry = LogEntry::new(LogLevel::Info, "core_auth", "Signed in");

        logger.log(entry).await.unwrap();
    }
}
