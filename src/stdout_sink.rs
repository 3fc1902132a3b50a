// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::log_line::LogLine;
use crate::sink::LineSink;

/**
The default sink: one line per message on stdout.
 */
#[derive(Debug, Clone)]
pub struct StdoutSink {}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Copy: safe for a zero-sized struct
// - PartialEq/Eq/Hash: all instances write to the same stream
// - Default: convenient zero-argument constructor
// - Display: NOT implemented, no meaningful representation

impl Copy for StdoutSink {}

impl PartialEq for StdoutSink {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for StdoutSink {}

impl std::hash::Hash for StdoutSink {
    fn hash<H: std::hash::Hasher>(&self, _state: &mut H) {}
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutSink {
    pub const fn new() -> Self {
        Self {}
    }
}

impl LineSink for StdoutSink {
    fn emit(&self, line: &LogLine<'_>) -> std::io::Result<()> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::io::Write;
            let mut lock = std::io::stdout().lock();
            writeln!(lock, "{}", line)
        }
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::log_1(&line.to_string().into());
            Ok(())
        }
    }

    fn flush(&self) -> std::io::Result<()> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::io::Write;
            std::io::stdout().lock().flush()
        }
        #[cfg(target_arch = "wasm32")]
        {
            //console is unbuffered
            Ok(())
        }
    }
}
