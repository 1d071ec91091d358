//! Progress logging for aggregation runs.
//!
//! A [`RunLog`] records every entry of one run, so callers get the warnings
//! back with the result, and optionally echoes each entry to stderr.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn marker(self) -> &'static str {
        match self {
            LogLevel::Info => "",
            LogLevel::Success => "✓ ",
            LogLevel::Warning => "⚠️ ",
            LogLevel::Error => "❌ ",
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth, rendered as indentation
    #[serde(default)]
    pub indent: u8,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "   ".repeat(self.indent as usize + 1);
        write!(f, "{}{}{}", indent, self.level.marker(), self.message)
    }
}

/// Entries of one run, in order
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    entries: Vec<LogEntry>,
    echo: bool,
}

impl RunLog {
    /// A log that also prints every entry to stderr
    pub fn echoing() -> Self {
        Self {
            entries: Vec::new(),
            echo: true,
        }
    }

    /// A log that only records
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: LogLevel, message: impl Into<String>, indent: u8) {
        let entry = LogEntry {
            level,
            message: message.into(),
            indent,
        };
        if self.echo {
            eprintln!("{}", entry);
        }
        self.entries.push(entry);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message, 0);
    }

    pub fn info_indent(&mut self, message: impl Into<String>, indent: u8) {
        self.push(LogLevel::Info, message, indent);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Success, message, 0);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message, 0);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message, 0);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries logged at [`LogLevel::Warning`]
    pub fn warnings(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| e.level == LogLevel::Warning)
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}
