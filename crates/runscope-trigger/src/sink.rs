//! Log sinks and build result holders.

use runscope_core::{BuildResult, BuildResultHolder, LogSink};
use std::io::Write;
use std::sync::{Mutex, OnceLock};
use tracing::{info, warn};

/// A line written to a [`BufferedLog`].
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// In-memory build log.
#[derive(Debug, Default)]
pub struct BufferedLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl BufferedLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    /// Whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|e| e.message.contains(needle))
    }
}

impl LogSink for BufferedLog {
    fn println(&self, line: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(LogEntry {
                message: line.to_string(),
                timestamp: chrono::Utc::now(),
            });
    }
}

/// Build log backed by any writer, typically stdout.
pub struct WriterLog<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl WriterLog<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> LogSink for WriterLog<W> {
    fn println(&self, line: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!(error = %e, "Failed to write build log line");
        }
    }
}

/// Build log that forwards lines to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn println(&self, line: &str) {
        info!(target: "runscope::build_log", "{}", line);
    }
}

/// Holds the build result; only the first write sticks.
#[derive(Debug, Default)]
pub struct BuildStatus {
    result: OnceLock<BuildResult>,
}

impl BuildStatus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BuildResultHolder for BuildStatus {
    fn set_result(&self, result: BuildResult) -> bool {
        self.result.set(result).is_ok()
    }

    fn result(&self) -> Option<BuildResult> {
        self.result.get().copied()
    }
}
