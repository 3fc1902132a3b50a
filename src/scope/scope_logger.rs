// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core ScopeLogger implementation.

use crate::error::{Result, ScopeError};
use crate::indent::IndentStrategy;
use crate::log_line::LogLine;
use crate::sink::LineSink;
use std::cell::RefCell;
use std::fmt::Display;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

use super::guard::ScopeGuard;
use super::scoped_future::Scoped;

/// Opens a nesting level after the message when it ends a message.
/// Closes one before the message when it starts a message.
pub const SIGIL: char = ':';

/// Internal logger data.
///
/// Held behind an Arc so a handle can be cloned into the ambient cell cheaply.
#[derive(Debug)]
pub(crate) struct ScopeLoggerInner {
    pub(crate) label: String,
    /// Never empty: the root frame can't be popped.
    pub(crate) depth: Mutex<Vec<u32>>,
    pub(crate) indent: Arc<dyn IndentStrategy>,
    pub(crate) sink: Arc<dyn LineSink>,
}

/// A logger that knows how deeply nested the code calling it is.
///
/// A `ScopeLogger` is a handle: cloning it yields the *same* logger (same counters),
/// and handles compare equal only when they point at the same logger. A logger
/// with fresh counters for a nested scope comes from [`log`](ScopeLogger::log) or
/// [`copy`](ScopeLogger::copy).
///
/// # Depth stack
///
/// The logger keeps one counter per nesting level, root first. Every call to
/// [`log`](ScopeLogger::log) bumps the innermost counter; the
/// [`IndentStrategy`] renders the whole stack as the line prefix.
///
/// # Sigils
///
/// Messages can move the logger between levels without entering a scope:
///
/// - `":message"` closes the current level *after* counting the message, and the
///   message is rendered at the parent level.
/// - `"message:"` renders the message, then opens a new level, so the next message
///   is numbered `1` one level deeper.
/// - `""` and `" "` are counted but not rendered, which allows silent level
///   changes such as `":"` (close) or `" :"` (open).
///
/// ```rust
/// use scopelog::{InMemorySink, ScopeLogger, numbered_indent};
/// use std::sync::Arc;
///
/// let sink = Arc::new(InMemorySink::new());
/// let logger = ScopeLogger::new("", numbered_indent(), sink.clone());
/// logger.log("steps:").unwrap();
/// logger.log("first").unwrap();
/// logger.log("second").unwrap();
/// logger.log(":done").unwrap();
/// logger.log("after").unwrap();
///
/// assert_eq!(
///     sink.drain_logs(),
///     "1. steps\n1. 1. first\n1. 2. second\n1. done\n2. after"
/// );
/// ```
///
/// # Scoped acquisition
///
/// [`enter`](ScopeLogger::enter) makes a logger the ambient logger of the current
/// thread until the returned guard is dropped, and [`scoped`](ScopeLogger::scoped)
/// does the same for every poll of a future. Either way, leaving the scope removes
/// one level from the entered logger.
#[derive(Debug, Clone)]
pub struct ScopeLogger {
    pub(crate) inner: Arc<ScopeLoggerInner>,
}

impl PartialEq for ScopeLogger {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ScopeLogger {}

impl Hash for ScopeLogger {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl Display for ScopeLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let depth = self.depth();
        write!(f, "[{}] {:?}", self.inner.label, depth)
    }
}

thread_local! {
    static AMBIENT: RefCell<Option<ScopeLogger>> = const { RefCell::new(None) };
}

/// Swaps `logger` into this thread's ambient cell and returns what was there.
///
/// Only [`ScopeGuard`] and [`Scoped`] call this.
pub(crate) fn set_current(logger: ScopeLogger) -> ScopeLogger {
    let previous = AMBIENT.with(|cell| cell.borrow_mut().replace(logger));
    previous.unwrap_or_else(crate::root::root_logger)
}

/// Like [`set_current`], but does nothing once the thread is tearing down its locals.
pub(crate) fn try_set_current(logger: ScopeLogger) {
    let _ = AMBIENT.try_with(|cell| cell.borrow_mut().replace(logger));
}

fn lock_depth(depth: &Mutex<Vec<u32>>) -> MutexGuard<'_, Vec<u32>> {
    //counters are plain integers, a panic elsewhere can't leave them half-written
    depth.lock().unwrap_or_else(|e| e.into_inner())
}

impl ScopeLogger {
    /// Creates a logger at the root level, with the stack `[0]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scopelog::{ScopeLogger, StdoutSink, space_indent};
    /// use std::sync::Arc;
    ///
    /// let logger = ScopeLogger::new("worker", space_indent(" "), Arc::new(StdoutSink::new()));
    /// assert_eq!(logger.depth(), vec![0]);
    /// assert_eq!(logger.label(), "worker");
    /// ```
    pub fn new(
        label: impl Into<String>,
        indent: Arc<dyn IndentStrategy>,
        sink: Arc<dyn LineSink>,
    ) -> ScopeLogger {
        Self::with_depth(label, indent, sink, vec![0])
    }

    /// Creates a logger with an explicit depth stack.
    ///
    /// An empty `depth` is replaced by `[0]`, since a logger always has a root frame.
    pub fn with_depth(
        label: impl Into<String>,
        indent: Arc<dyn IndentStrategy>,
        sink: Arc<dyn LineSink>,
        mut depth: Vec<u32>,
    ) -> ScopeLogger {
        if depth.is_empty() {
            depth.push(0);
        }
        ScopeLogger {
            inner: Arc::new(ScopeLoggerInner {
                label: label.into(),
                depth: Mutex::new(depth),
                indent,
                sink,
            }),
        }
    }

    /// Returns the ambient logger for this thread.
    ///
    /// Every thread starts out with the process [root logger](crate::root_logger).
    /// Inside an entered scope, or while a [`Scoped`] future is being polled, this
    /// is the logger of the innermost such scope.
    ///
    /// ```rust
    /// use scopelog::ScopeLogger;
    ///
    /// let current = ScopeLogger::current();
    /// println!("logging as {}", current.label());
    /// ```
    #[inline]
    pub fn current() -> ScopeLogger {
        let current = AMBIENT.with(|cell| cell.borrow().clone());
        match current {
            Some(logger) => logger,
            None => {
                let root = crate::root::root_logger();
                AMBIENT.with(|cell| {
                    cell.borrow_mut().get_or_insert_with(|| root).clone()
                })
            }
        }
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn indent(&self) -> &Arc<dyn IndentStrategy> {
        &self.inner.indent
    }

    pub fn sink(&self) -> &Arc<dyn LineSink> {
        &self.inner.sink
    }

    /// A snapshot of the counters, root first.
    pub fn depth(&self) -> Vec<u32> {
        lock_depth(&self.inner.depth).clone()
    }

    /// Number of levels below the root; `0` for a fresh logger.
    pub fn nesting_level(&self) -> usize {
        lock_depth(&self.inner.depth).len() - 1
    }

    /// Opens a nesting level: appends a `0` counter.
    pub fn enter_child_scope(&self) {
        lock_depth(&self.inner.depth).push(0);
    }

    /// Closes the innermost nesting level, discarding its counter.
    ///
    /// # Errors
    ///
    /// [`ScopeError::Underflow`] if only the root frame is left; the stack is not
    /// modified in that case.
    pub fn exit_child_scope(&self) -> Result<()> {
        let mut depth = lock_depth(&self.inner.depth);
        self.pop_frame(&mut depth)
    }

    fn pop_frame(&self, depth: &mut Vec<u32>) -> Result<()> {
        if depth.len() <= 1 {
            return Err(ScopeError::Underflow {
                label: self.inner.label.clone(),
            });
        }
        depth.pop();
        Ok(())
    }

    /// Logs `message` and returns a logger for the scope nested under it.
    ///
    /// The steps, in order:
    ///
    /// 1. the innermost counter is incremented;
    /// 2. a leading `':'` is stripped and one level is closed;
    /// 3. a trailing `':'` is stripped and remembered;
    /// 4. unless what remains is `""` or `" "`, the line goes to the sink;
    /// 5. if a trailing `':'` was stripped, a new level is opened.
    ///
    /// The returned logger is a [`copy`](ScopeLogger::copy): same label, indent and
    /// sink, with the current stack plus one fresh level. Enter it to log
    /// underneath this line.
    ///
    /// The sink is called without any lock held, so a sink may itself log.
    ///
    /// # Errors
    ///
    /// - [`ScopeError::Underflow`] if a leading `':'` would close the root level.
    ///   The counter has already been incremented at that point.
    /// - [`ScopeError::Sink`] if the sink fails. The remembered level from a
    ///   trailing `':'` is not opened.
    pub fn log(&self, message: impl AsRef<str>) -> Result<ScopeLogger> {
        let message = message.as_ref();
        let snapshot = {
            let mut depth = lock_depth(&self.inner.depth);
            if let Some(last) = depth.last_mut() {
                *last = last.saturating_add(1);
            }
            if message.starts_with(SIGIL) {
                self.pop_frame(&mut depth)?;
            }
            depth.clone()
        };
        let message = message.strip_prefix(SIGIL).unwrap_or(message);
        let (message, opens) = match message.strip_suffix(SIGIL) {
            Some(stripped) => (stripped, true),
            None => (message, false),
        };

        if !message.is_empty() && message != " " {
            let line = LogLine::new(message, &self.inner.label, &snapshot, &*self.inner.indent);
            self.inner.sink.emit(&line)?;
        }

        if opens {
            self.enter_child_scope();
        }
        Ok(self.copy())
    }

    /// A new logger one level below this one, with its own counters.
    ///
    /// ```rust
    /// use scopelog::{ScopeLogger, StdoutSink, none_indent};
    /// use std::sync::Arc;
    ///
    /// let parent = ScopeLogger::with_depth("", none_indent(), Arc::new(StdoutSink::new()), vec![3, 1]);
    /// let child = parent.copy();
    /// assert_eq!(child.depth(), vec![3, 1, 0]);
    /// assert_ne!(parent, child);
    /// ```
    pub fn copy(&self) -> ScopeLogger {
        let mut depth = self.depth();
        depth.push(0);
        ScopeLogger::with_depth(
            self.inner.label.clone(),
            self.inner.indent.clone(),
            self.inner.sink.clone(),
            depth,
        )
    }

    /// Makes this logger ambient until the guard is released.
    ///
    /// Releasing the guard restores the previous ambient logger and closes one
    /// level of this logger.
    ///
    /// ```rust
    /// use scopelog::ScopeLogger;
    ///
    /// let before = ScopeLogger::current();
    /// let child = before.copy();
    /// {
    ///     let _guard = child.clone().enter();
    ///     assert_eq!(ScopeLogger::current(), child);
    /// }
    /// assert_eq!(ScopeLogger::current(), before);
    /// ```
    pub fn enter(self) -> ScopeGuard {
        ScopeGuard::enter(self, true)
    }

    /// Makes a root-level logger ambient until the guard is released, without
    /// closing a level on release.
    ///
    /// This is how a thread or a test switches to its own logger: entering a fresh
    /// logger with [`enter`](ScopeLogger::enter) would try to close its root level on
    /// release, which is a [`ScopeError::Underflow`].
    ///
    /// ```rust
    /// use scopelog::{InMemorySink, ScopeLogger, none_indent};
    /// use std::sync::Arc;
    ///
    /// let sink = Arc::new(InMemorySink::new());
    /// let _guard = ScopeLogger::new("test", none_indent(), sink.clone()).install();
    /// scopelog::log("captured").unwrap();
    /// assert_eq!(sink.drain_logs(), "[test] captured");
    /// ```
    pub fn install(self) -> ScopeGuard {
        ScopeGuard::enter(self, false)
    }

    /// Makes this logger ambient whenever `future` is polled.
    ///
    /// This is the asynchronous form of [`enter`](ScopeLogger::enter): thread-local
    /// state doesn't follow a future across suspension points, so the scope is
    /// re-installed around every poll instead. One level of this logger is closed
    /// when the future completes, or when it is dropped unfinished.
    pub fn scoped<F: Future>(self, future: F) -> Scoped<F> {
        Scoped::new(self, future, true)
    }

    /// Makes this logger ambient whenever `future` is polled, without closing a
    /// level when it finishes.
    ///
    /// This is the asynchronous form of [`install`](ScopeLogger::install). Use it to
    /// hand the ambient logger to a future that runs elsewhere, such as a spawned
    /// task or another thread, so it logs where it was created:
    ///
    /// ```rust
    /// use scopelog::{InMemorySink, ScopeLogger, numbered_indent};
    /// use std::sync::Arc;
    ///
    /// let sink = Arc::new(InMemorySink::new());
    /// let _root = ScopeLogger::new("", numbered_indent(), sink.clone()).install();
    /// let child = scopelog::log("batch").unwrap();
    /// let _scope = child.clone().enter();
    ///
    /// let task = ScopeLogger::current().apply(async {
    ///     scopelog::log("subtask").unwrap();
    /// });
    /// std::thread::spawn(move || futures::executor::block_on(task))
    ///     .join()
    ///     .unwrap();
    ///
    /// assert_eq!(sink.drain_logs(), "1. batch\n1. 1. subtask");
    /// assert_eq!(child.depth(), vec![1, 1]);
    /// ```
    pub fn apply<F: Future>(self, future: F) -> Scoped<F> {
        Scoped::new(self, future, false)
    }
}

/// Called when leaving a scope fails somewhere a `Result` can't be returned.
///
/// Mismatched enter/exit is a programmer error, so this panics, unless the thread
/// is already unwinding, where a second panic would abort.
pub(crate) fn release_failed(error: ScopeError) {
    if std::thread::panicking() {
        eprintln!("scopelog: {error} (while unwinding)");
    } else {
        panic!("scopelog: {error}");
    }
}
