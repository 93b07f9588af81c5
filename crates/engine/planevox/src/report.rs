//! Progress and diagnostic reporting
//!
//! The engine never prints. Every phase hands its messages to a [`Reporter`]
//! supplied by the caller; [`TracingReporter`] forwards them to `tracing`.

use std::sync::Mutex;

/// Severity of a reported message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Sink for progress, warnings, and recoverable errors
pub trait Reporter {
    fn report(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.report(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.report(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }
}

/// Forwards messages to `tracing` under the `planevox` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: Level, message: &str) {
        match level {
            Level::Debug => tracing::debug!(target: "planevox", "{message}"),
            Level::Info => tracing::info!(target: "planevox", "{message}"),
            Level::Warn => tracing::warn!(target: "planevox", "{message}"),
            Level::Error => tracing::error!(target: "planevox", "{message}"),
        }
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _level: Level, _message: &str) {}
}

/// Records messages in memory, for tests and for embedding hosts that
/// display diagnostics themselves.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every message recorded so far
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Messages at exactly `level`
    pub fn at(&self, level: Level) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn has(&self, level: Level, needle: &str) -> bool {
        self.at(level).iter().any(|m| m.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}
