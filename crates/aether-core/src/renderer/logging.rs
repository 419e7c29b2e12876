// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The logging boundary of the graphics layer.
//!
//! Lifecycle chatter goes straight to the `log` facade. Fatal conditions go through a
//! [`GraphicsLogger`] that every device receives at construction, so embedders can
//! route them anywhere and tests can count them.

use std::fmt;
use std::sync::{Arc, Mutex};

/// How serious a graphics message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Verbose diagnostics.
    Debug,
    /// Normal lifecycle events.
    Info,
    /// Something unexpected that does not stop the operation.
    Warn,
    /// An operation failed and its error is about to propagate.
    Critical,
}

impl Severity {
    /// The `log` level used when forwarding to the facade.
    pub fn as_log_level(&self) -> log::Level {
        match self {
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::Warn => log::Level::Warn,
            Severity::Critical => log::Level::Error,
        }
    }
}

/// Receives graphics messages.
pub trait LogSink: Send + Sync {
    /// Handles one message emitted by the logger called `logger`.
    fn write(&self, logger: &str, severity: Severity, message: &str);
}

/// A sink that forwards every message to the `log` facade, with the logger name as target.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeSink;

impl LogSink for FacadeSink {
    fn write(&self, logger: &str, severity: Severity, message: &str) {
        log::log!(target: logger, severity.as_log_level(), "{message}");
    }
}

/// A sink that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(Severity, String)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every message received so far.
    pub fn records(&self) -> Vec<(Severity, String)> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The number of messages received at `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.records()
            .iter()
            .filter(|(level, _)| *level == severity)
            .count()
    }
}

impl LogSink for MemorySink {
    fn write(&self, _logger: &str, severity: Severity, message: &str) {
        let mut records = match self.records.lock() {
            Ok(records) => records,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.push((severity, message.to_string()));
    }
}

/// A named handle to a [`LogSink`].
#[derive(Clone)]
pub struct GraphicsLogger {
    name: String,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for GraphicsLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsLogger")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Default for GraphicsLogger {
    fn default() -> Self {
        Self::new("Graphics", Arc::new(FacadeSink))
    }
}

impl GraphicsLogger {
    /// Creates a logger writing to `sink` under `name`.
    pub fn new(name: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            name: name.into(),
            sink,
        }
    }

    /// The name messages are reported under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reports a failure that is about to propagate as an error.
    pub fn critical(&self, message: impl AsRef<str>) {
        self.sink
            .write(&self.name, Severity::Critical, message.as_ref());
    }

    /// Reports an unexpected but recoverable condition.
    pub fn warn(&self, message: impl AsRef<str>) {
        self.sink.write(&self.name, Severity::Warn, message.as_ref());
    }

    /// Reports a lifecycle event.
    pub fn info(&self, message: impl AsRef<str>) {
        self.sink.write(&self.name, Severity::Info, message.as_ref());
    }

    /// Reports a diagnostic detail.
    pub fn debug(&self, message: impl AsRef<str>) {
        self.sink
            .write(&self.name, Severity::Debug, message.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_counts_by_severity() {
        let sink = Arc::new(MemorySink::new());
        let logger = GraphicsLogger::new("Graphics", sink.clone());
        logger.critical("root signature rejected");
        logger.info("device ready");
        logger.info("pipeline built");
        assert_eq!(sink.count(Severity::Critical), 1);
        assert_eq!(sink.count(Severity::Info), 2);
        assert_eq!(sink.records()[0].1, "root signature rejected");
    }

    #[test]
    fn default_logger_is_named_graphics() {
        assert_eq!(GraphicsLogger::default().name(), "Graphics");
    }
}
