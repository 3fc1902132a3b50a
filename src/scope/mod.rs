// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scope loggers and the ambient logger of each thread.
//!
//! This module provides the core of scopelog: a [`ScopeLogger`] that numbers and
//! indents lines by nesting level, and the machinery that decides which logger is
//! *ambient*, meaning the one that [`crate::log`] writes to.
//!
//! # Overview
//!
//! - [`ScopeLogger`]: a handle to a logger with a label, a depth stack, an indent
//!   strategy and a sink
//! - [`ScopeGuard`]: keeps a logger ambient on the current thread until dropped
//! - [`Scoped`]: a [`Future`](std::future::Future) wrapper that keeps a logger
//!   ambient while the future is polled
//!
//! # Thread-local ambient logger
//!
//! Each thread has its own ambient logger, starting out as the process
//! [root logger](crate::root_logger). Entering a scope replaces it for the
//! duration of the scope:
//!
//! ```rust
//! use scopelog::{InMemorySink, ScopeLogger, space_indent};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(InMemorySink::new());
//! let _root = ScopeLogger::new("job", space_indent("  "), sink.clone()).install();
//!
//! let child = scopelog::log("load").unwrap();
//! {
//!     let _guard = child.enter();
//!     scopelog::log("open file").unwrap();
//!     scopelog::log("parse").unwrap();
//! }
//! scopelog::log("done").unwrap();
//!
//! assert_eq!(
//!     sink.lines(),
//!     vec!["[job] load", "[job]   open file", "[job]   parse", "[job] done"]
//! );
//! ```
//!
//! # Async scopes
//!
//! Futures can be suspended and resumed on a different thread, so a guard can't be
//! held across an `.await`. Wrap the future with [`ScopeLogger::scoped`] instead:
//!
//! ```rust
//! use scopelog::ScopeLogger;
//! # async fn upload() {}
//!
//! # async fn example() {
//! let child = scopelog::log("upload").unwrap();
//! child.scoped(upload()).await;
//! # }
//! ```
//!
//! [`ScopeLogger::apply`] is the async counterpart of [`ScopeLogger::install`]: the
//! future logs through the given logger wherever it is polled, and no level is
//! closed when it finishes. Use it to hand the current scope to a spawned task.

mod guard;
mod scope_logger;
mod scoped_future;

#[cfg(test)]
mod tests;

pub use guard::ScopeGuard;
pub use scope_logger::{SIGIL, ScopeLogger};
pub use scoped_future::Scoped;
