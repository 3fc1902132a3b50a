// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Sink
//!
//! [`InMemorySink`] keeps rendered lines in memory instead of printing them. This is
//! the sink to use for:
//!
//! - Unit testing code that is instrumented with scopelog
//! - Programmatically examining the shape of a trace
//! - Environments where stdout is redirected or unavailable
//!
//! The lines are stored behind a `Mutex`, so one sink can be shared by loggers on
//! several threads.

use crate::log_line::LogLine;
use crate::sink::LineSink;
use std::sync::{Mutex, MutexGuard};

/// A sink that stores each rendered line in a `Vec<String>`.
///
/// # Example
///
/// ```rust
/// use scopelog::{InMemorySink, ScopeLogger, numbered_indent};
/// use std::sync::Arc;
///
/// let sink = Arc::new(InMemorySink::new());
/// let logger = ScopeLogger::new("test", numbered_indent(), sink.clone());
/// logger.log("first").unwrap();
/// logger.log("second").unwrap();
///
/// assert_eq!(sink.drain_logs(), "[test] 1. first\n[test] 2. second");
/// assert_eq!(sink.drain_logs(), "");
/// ```
#[derive(Debug)]
pub struct InMemorySink {
    lines: Mutex<Vec<String>>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: derived, required by LineSink
// - Default: empty buffer
// - Clone: NOT implemented, a copy would silently split the captured output
// - PartialEq/Eq/Hash: NOT implemented, comparing mutex contents is racy

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySink {
    /// Creates a sink with an empty buffer.
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        //a panicking test thread shouldn't hide what was captured before it
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns all captured lines joined by newlines and clears the buffer.
    pub fn drain_logs(&self) -> String {
        let mut lines = self.lock();
        let result = lines.join("\n");
        lines.clear();
        result
    }

    /// A snapshot of the captured lines, leaving the buffer intact.
    pub fn lines(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Writes all captured lines to stderr and clears the buffer.
    ///
    /// Handy when a test fails and you want to see the trace that led there.
    pub fn drain_to_console(&self) {
        let mut lines = self.lock();
        for line in lines.iter() {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::log_1(&line.clone().into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("{}", line);
        }
        lines.clear();
    }
}

impl LineSink for InMemorySink {
    fn emit(&self, line: &LogLine<'_>) -> std::io::Result<()> {
        let rendered = line.to_string();
        self.lock().push(rendered);
        Ok(())
    }

    fn flush(&self) -> std::io::Result<()> {
        Ok(())
    }
}
