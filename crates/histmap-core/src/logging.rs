//! # Stage Logger
//!
//! The one collaborator the pipeline stages need from their caller besides
//! file paths. Stages format plain strings; the implementation decides where
//! they go.
//!
//! - [`TracingLogger`] forwards to `tracing` with a `stage` field.
//! - [`MemoryLogger`] records lines in memory for tests and embedders.

use std::sync::Mutex;

/// Sink for stage log lines.
pub trait StageLogger: Send + Sync {
    /// Informational line.
    fn info(&self, stage: &str, message: &str);
    /// Error line. Always shown.
    fn error(&self, stage: &str, message: &str);
}

impl<L: StageLogger + ?Sized> StageLogger for &L {
    fn info(&self, stage: &str, message: &str) {
        (**self).info(stage, message)
    }

    fn error(&self, stage: &str, message: &str) {
        (**self).error(stage, message)
    }
}

impl<L: StageLogger + ?Sized> StageLogger for std::sync::Arc<L> {
    fn info(&self, stage: &str, message: &str) {
        (**self).info(stage, message)
    }

    fn error(&self, stage: &str, message: &str) {
        (**self).error(stage, message)
    }
}

/// Forwards stage lines to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl StageLogger for TracingLogger {
    fn info(&self, stage: &str, message: &str) {
        tracing::info!(stage, "{message}");
    }

    fn error(&self, stage: &str, message: &str) {
        tracing::error!(stage, "{message}");
    }
}

/// Severity of a recorded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

/// A line captured by [`MemoryLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub stage: String,
    pub message: String,
}

/// Records every line it receives, in order.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded lines.
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Recorded lines at `level`.
    pub fn lines_at(&self, level: LogLevel) -> Vec<LogLine> {
        self.lines()
            .into_iter()
            .filter(|l| l.level == level)
            .collect()
    }

    fn push(&self, level: LogLevel, stage: &str, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(LogLine {
                level,
                stage: stage.to_string(),
                message: message.to_string(),
            });
    }
}

impl StageLogger for MemoryLogger {
    fn info(&self, stage: &str, message: &str) {
        self.push(LogLevel::Info, stage, message);
    }

    fn error(&self, stage: &str, message: &str) {
        self.push(LogLevel::Error, stage, message);
    }
}
