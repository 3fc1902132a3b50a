// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asynchronous scoped acquisition.

use std::future::Future;
use std::pin::Pin;
use std::task::Poll;

use pin_project::{pin_project, pinned_drop};

use super::scope_logger::{ScopeLogger, release_failed, set_current, try_set_current};

/// A [`Future`] wrapper that keeps a scope ambient across suspension points.
///
/// The ambient logger lives in thread-local storage, which doesn't travel with a
/// future: between polls, the thread may run other tasks, and the next poll may
/// happen on another thread. `Scoped` makes the scope explicit instead:
///
/// 1. before each poll, it installs the logger that was ambient inside the scope
///    when the previous poll returned (the scope's own logger on the first poll),
/// 2. polls the inner future,
/// 3. remembers what the inner future left ambient, and
/// 4. restores whatever was ambient before the poll.
///
/// So nested scopes inside the future resume where they left off, and nothing
/// inside the future leaks into the task that polls it, even if the poll panics.
///
/// When the inner future completes, or when `Scoped` is dropped before that
/// (cancellation), one level of the scope's logger is closed. Futures from
/// [`ScopeLogger::apply`] skip that step.
///
/// # Examples
///
/// ```rust
/// use scopelog::{InMemorySink, ScopeLogger, numbered_indent};
/// use std::sync::Arc;
///
/// async fn fetch() -> u32 {
///     scopelog::log("fetching").unwrap();
///     7
/// }
///
/// # async fn example() {
/// let sink = Arc::new(InMemorySink::new());
/// let _guard = ScopeLogger::new("", numbered_indent(), sink.clone()).install();
///
/// let child = scopelog::log("task").unwrap();
/// assert_eq!(child.scoped(fetch()).await, 7);
/// assert_eq!(sink.drain_logs(), "1. task\n1. 1. fetching");
/// # }
/// ```
#[pin_project(PinnedDrop)]
#[must_use = "futures do nothing unless polled"]
pub struct Scoped<F> {
    #[pin]
    inner: F,
    logger: ScopeLogger,
    /// What was ambient inside the scope when the last poll returned.
    inside: Option<ScopeLogger>,
    closes_level: bool,
    finished: bool,
}

impl<F> Scoped<F> {
    pub(crate) fn new(logger: ScopeLogger, inner: F, closes_level: bool) -> Self {
        Self {
            inner,
            logger,
            inside: None,
            closes_level,
            finished: false,
        }
    }

    fn finish(logger: &ScopeLogger, closes_level: bool, finished: &mut bool) {
        if *finished {
            return;
        }
        *finished = true;
        if closes_level {
            if let Err(e) = logger.exit_child_scope() {
                release_failed(e);
            }
        }
    }

    /// The logger this future keeps ambient.
    pub fn logger(&self) -> &ScopeLogger {
        &self.logger
    }
}

/// Puts the outer ambient logger back, also when a poll unwinds.
struct Restore {
    outside: Option<ScopeLogger>,
}

impl Restore {
    fn install(inside: ScopeLogger) -> Self {
        Restore {
            outside: Some(set_current(inside)),
        }
    }

    /// Restores the outer logger and returns what was ambient inside.
    fn finish(mut self) -> Option<ScopeLogger> {
        self.outside.take().map(set_current)
    }
}

impl Drop for Restore {
    fn drop(&mut self) {
        if let Some(outside) = self.outside.take() {
            try_set_current(outside);
        }
    }
}

impl<F> Future for Scoped<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let inside = this.inside.take().unwrap_or_else(|| this.logger.clone());
        let restore = Restore::install(inside);
        let r = this.inner.poll(cx);
        *this.inside = restore.finish();

        if r.is_ready() {
            *this.inside = None;
            Self::finish(this.logger, *this.closes_level, this.finished);
        }
        r
    }
}

#[pinned_drop]
impl<F> PinnedDrop for Scoped<F> {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        Scoped::<F>::finish(this.logger, *this.closes_level, this.finished);
    }
}
