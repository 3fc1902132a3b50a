// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous scoped acquisition.

use std::marker::PhantomData;

use super::scope_logger::{ScopeLogger, release_failed, set_current, try_set_current};
use crate::error::Result;

/// Keeps a [`ScopeLogger`] ambient on this thread.
///
/// Created by [`ScopeLogger::enter`]. On release the guard
///
/// 1. restores the logger that was ambient when it was created, then
/// 2. closes one level of its own logger.
///
/// Guards from [`ScopeLogger::install`] skip step 2.
///
/// Release happens on drop, so it also happens while unwinding from a panic. Use
/// [`exit`](ScopeGuard::exit) to release early and see the error instead of
/// panicking when the level can't be closed.
///
/// Guards must be released in the reverse order they were created; they are tied to
/// the thread that created them (`!Send`).
///
/// ```rust
/// use scopelog::{InMemorySink, ScopeLogger, numbered_indent};
/// use std::sync::Arc;
///
/// let sink = Arc::new(InMemorySink::new());
/// let root = ScopeLogger::new("", numbered_indent(), sink.clone());
/// let _root_guard = root.clone().install();
///
/// let child = scopelog::log("outer").unwrap();
/// {
///     let _guard = child.enter();
///     scopelog::log("inner").unwrap();
/// }
/// scopelog::log("next").unwrap();
/// assert_eq!(sink.drain_logs(), "1. outer\n1. 1. inner\n2. next");
/// ```
#[must_use = "the scope is exited as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard {
    logger: ScopeLogger,
    previous: Option<ScopeLogger>,
    closes_level: bool,
    _not_send: PhantomData<*const ()>,
}

impl ScopeGuard {
    pub(crate) fn enter(logger: ScopeLogger, closes_level: bool) -> ScopeGuard {
        let previous = set_current(logger.clone());
        ScopeGuard {
            logger,
            previous: Some(previous),
            closes_level,
            _not_send: PhantomData,
        }
    }

    /// The logger this guard keeps ambient.
    pub fn logger(&self) -> &ScopeLogger {
        &self.logger
    }

    /// Releases the guard now.
    ///
    /// # Errors
    ///
    /// [`ScopeError::Underflow`](crate::ScopeError::Underflow) if the entered logger
    /// was already at its root level. The previous ambient logger is restored either
    /// way.
    pub fn exit(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        match self.previous.take() {
            Some(previous) => {
                try_set_current(previous);
                if self.closes_level {
                    self.logger.exit_child_scope()
                } else {
                    Ok(())
                }
            }
            None => Ok(()),
        }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            release_failed(e);
        }
    }
}
