//! Pipeline progress logging.
//!
//! Stages report progress through the `log_*` helpers. Each entry becomes a
//! `tracing` event under the `census` target, so the subscriber installed by
//! the binary (or none, in tests) decides where it goes.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log level for pipeline progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth for detail lines under a stage heading.
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Message with its indentation and level marker applied.
    pub fn render(&self) -> String {
        let marker = match self.level {
            LogLevel::Info => "",
            LogLevel::Success => "✓ ",
            LogLevel::Warning => "⚠ ",
            LogLevel::Error => "✗ ",
        };
        format!("{}{}{}", "  ".repeat(self.indent as usize), marker, self.message)
    }

    /// Emit this entry as a `tracing` event.
    pub fn emit(&self) {
        let line = self.render();
        match self.level {
            LogLevel::Info => tracing::info!(target: "census", "{line}"),
            LogLevel::Success => tracing::info!(target: "census", outcome = "success", "{line}"),
            LogLevel::Warning => tracing::warn!(target: "census", "{line}"),
            LogLevel::Error => tracing::error!(target: "census", "{line}"),
        }
    }
}

/// Install the global `tracing` subscriber for the CLI.
///
/// `RUST_LOG` wins when set; otherwise `census=info`, or `census=debug` when
/// `verbose` is requested. Calling this twice is harmless.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose { "census=debug" } else { "census=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn log_info(msg: impl Into<String>) {
    LogEntry::info(msg).emit();
}

pub fn log_success(msg: impl Into<String>) {
    LogEntry::success(msg).emit();
}

pub fn log_warning(msg: impl Into<String>) {
    LogEntry::warning(msg).emit();
}

pub fn log_error(msg: impl Into<String>) {
    LogEntry::error(msg).emit();
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LogEntry::info(msg).with_indent(indent).emit();
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    LogEntry::warning(msg).with_indent(indent).emit();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markers_and_indent() {
        assert_eq!(LogEntry::info("Reading").render(), "Reading");
        assert_eq!(LogEntry::success("Done").render(), "✓ Done");
        assert_eq!(LogEntry::warning("3 dropped").with_indent(1).render(), "  ⚠ 3 dropped");
    }

    #[test]
    fn test_entry_serialization() {
        let entry = LogEntry::error("boom").with_indent(2);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["indent"], 2);
    }
}
