// SPDX-License-Identifier: MIT OR Apache-2.0

//! The unit handed to a [`LineSink`](crate::LineSink).
//!
//! A [`LogLine`] borrows everything it needs from the emitting
//! [`ScopeLogger`](crate::ScopeLogger): nothing is concatenated until a sink actually
//! asks for the rendered text. Sinks that only count or filter lines never pay for
//! formatting.
//!
//! # Rendering
//!
//! The [`Display`] implementation produces the canonical line, without a terminator:
//!
//! ```text
//! [label] <indent><message>     when the label is non-empty
//! <indent><message>             otherwise
//! ```
//!
//! ```rust
//! use scopelog::{LogLine, NumberedIndent};
//!
//! let line = LogLine::new("loading", "app", &[1, 2], &NumberedIndent);
//! assert_eq!(line.to_string(), "[app] 1. 2. loading");
//! ```

use crate::indent::IndentStrategy;
use std::fmt::Display;

/**
One logical log line.

Created by [`ScopeLogger::log`](crate::ScopeLogger::log) for every message that is not
suppressed, and borrowed by the sink for the duration of
[`LineSink::emit`](crate::LineSink::emit).
*/
#[derive(Debug, Clone, Copy)]
pub struct LogLine<'a> {
    message: &'a str,
    label: &'a str,
    depth: &'a [u32],
    indent: &'a dyn IndentStrategy,
}

impl<'a> LogLine<'a> {
    pub fn new(
        message: &'a str,
        label: &'a str,
        depth: &'a [u32],
        indent: &'a dyn IndentStrategy,
    ) -> Self {
        Self {
            message,
            label,
            depth,
            indent,
        }
    }

    /// The message with any sigils already stripped.
    pub fn message(&self) -> &'a str {
        self.message
    }

    pub fn label(&self) -> &'a str {
        self.label
    }

    /// Snapshot of the counters at the moment of logging, root first.
    pub fn depth(&self) -> &'a [u32] {
        self.depth
    }

    pub fn indent(&self) -> &'a dyn IndentStrategy {
        self.indent
    }

    /// The indentation prefix alone.
    pub fn prefix(&self) -> String {
        self.indent.render(self.depth)
    }
}

impl Display for LogLine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.label.is_empty() {
            write!(f, "[{}] ", self.label)?;
        }
        write!(f, "{}{}", self.prefix(), self.message)
    }
}

/*
Boilerplate notes for LogLine:

- Copy/Clone: all fields are borrows
- PartialEq/Eq/Hash: not implemented, comparing trait objects has no clear meaning
- Default: no sensible zero value for the borrowed indent
- Send/Sync: automatic, since IndentStrategy requires both
*/
