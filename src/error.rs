// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types.

use thiserror::Error;

/// Result type for scope operations.
pub type Result<T> = std::result::Result<T, ScopeError>;

/// Errors raised by [`ScopeLogger`](crate::ScopeLogger) operations.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// A scope was exited with no parent frame left.
    ///
    /// This is always a caller bug: an `exit` without a matching `enter`, or a
    /// `":"`-prefixed message logged at the root.
    #[error("scope underflow: tried to exit the root scope of logger `{label}`")]
    Underflow { label: String },

    /// The sink failed to write a line.
    #[error("sink error: {0}")]
    Sink(#[from] std::io::Error),
}

impl ScopeError {
    pub fn is_underflow(&self) -> bool {
        matches!(self, ScopeError::Underflow { .. })
    }
}
