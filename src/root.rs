// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide root logger.
//!
//! Every thread's ambient logger starts out as the root logger. Unless a program
//! replaces it, the root is labelled `"GLOBAL"`, indents with single spaces and
//! writes to stdout.
//!
//! The root is one shared instance: its counters are shared by all threads that
//! log at root level, and protected by the logger's own lock.
//!
//! # Examples
//!
//! Configure the facility once at startup:
//!
//! ```
//! use scopelog::root::{root_logger, set_root_logger};
//! use scopelog::{ScopeLogger, StdoutSink, numbered_indent};
//! use std::sync::Arc;
//!
//! let app = ScopeLogger::new("app", numbered_indent(), Arc::new(StdoutSink::new()));
//! set_root_logger(app.clone());
//! assert_eq!(root_logger(), app);
//! ```
//!
//! # Scope of a replacement
//!
//! A thread reads the root the first time it asks for its ambient logger, and keeps
//! that handle. Replacing the root therefore affects threads that haven't logged yet;
//! it doesn't reach into threads that already have. Configure early.

use crate::indent::space_indent;
use crate::scope::ScopeLogger;
use crate::stdout_sink::StdoutSink;
use std::sync::{Arc, Mutex, OnceLock};

/// Label of the default root logger.
pub const ROOT_LABEL: &str = "GLOBAL";

static ROOT: OnceLock<Mutex<ScopeLogger>> = OnceLock::new();

fn default_root() -> ScopeLogger {
    ScopeLogger::new(ROOT_LABEL, space_indent(" "), Arc::new(StdoutSink::new()))
}

fn root_cell() -> &'static Mutex<ScopeLogger> {
    ROOT.get_or_init(|| Mutex::new(default_root()))
}

/// Returns the current root logger.
///
/// ```
/// let root = scopelog::root_logger();
/// assert!(!root.label().is_empty());
/// ```
pub fn root_logger() -> ScopeLogger {
    root_cell()
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Replaces the root logger, returning the previous one.
pub fn set_root_logger(logger: ScopeLogger) -> ScopeLogger {
    let mut root = root_cell().lock().unwrap_or_else(|e| e.into_inner());
    std::mem::replace(&mut *root, logger)
}
