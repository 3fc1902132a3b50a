// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tests for the scope module.

use super::scope_logger::ScopeLogger;
use crate::error::ScopeError;
use crate::indent::{none_indent, numbered_indent};
use crate::inmemory_sink::InMemorySink;
use crate::log_line::LogLine;
use crate::sink::LineSink;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_test::*;
#[cfg(target_arch = "wasm32")]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn numbered(sink: &Arc<InMemorySink>) -> ScopeLogger {
    ScopeLogger::new("", numbered_indent(), sink.clone())
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn counters_without_sigils() {
    let sink = Arc::new(InMemorySink::new());
    let logger = numbered(&sink);
    logger.log("a").unwrap();
    logger.log("b").unwrap();
    logger.log("c").unwrap();
    assert_eq!(sink.drain_logs(), "1. a\n2. b\n3. c");
    assert_eq!(logger.depth(), vec![3]);
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn leading_sigil_closes_a_level() {
    let sink = Arc::new(InMemorySink::new());
    let logger = ScopeLogger::with_depth("", numbered_indent(), sink.clone(), vec![2, 4]);
    logger.log(":up").unwrap();
    assert_eq!(logger.depth(), vec![2]);
    assert_eq!(sink.drain_logs(), "2. up");

    logger.log("next").unwrap();
    assert_eq!(sink.drain_logs(), "3. next");
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn trailing_sigil_opens_a_level() {
    let sink = Arc::new(InMemorySink::new());
    let logger = numbered(&sink);
    logger.log("x:").unwrap();
    assert_eq!(logger.depth(), vec![1, 0]);
    logger.log("y").unwrap();
    assert_eq!(sink.drain_logs(), "1. x\n1. 1. y");
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn blank_messages_count_but_are_not_written() {
    let sink = Arc::new(InMemorySink::new());
    let logger = numbered(&sink);
    logger.log("").unwrap();
    logger.log(" ").unwrap();
    logger.log("third").unwrap();
    assert_eq!(sink.drain_logs(), "3. third");
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn silent_level_changes() {
    let sink = Arc::new(InMemorySink::new());
    let logger = numbered(&sink);
    logger.log(" :").unwrap();
    assert_eq!(logger.depth(), vec![1, 0]);
    logger.log("::").unwrap();
    assert_eq!(logger.depth(), vec![1, 0]);
    logger.log(":").unwrap();
    assert_eq!(logger.depth(), vec![1]);
    assert!(sink.is_empty());
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn leading_sigil_at_root_underflows() {
    let sink = Arc::new(InMemorySink::new());
    let logger = ScopeLogger::new("root", none_indent(), sink.clone());
    let err = logger.log(":too far").unwrap_err();
    assert!(err.is_underflow());
    assert!(matches!(err, ScopeError::Underflow { ref label } if label == "root"));
    //counted, not written, stack intact
    assert_eq!(logger.depth(), vec![1]);
    assert!(sink.is_empty());

    assert!(logger.exit_child_scope().is_err());
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn copy_is_independent() {
    let sink = Arc::new(InMemorySink::new());
    let parent = numbered(&sink);
    let child = parent.log("p").unwrap();
    assert_eq!(child.depth(), vec![1, 0]);

    child.log("c").unwrap();
    child.log("c:").unwrap();
    assert_eq!(parent.depth(), vec![1]);
    assert_eq!(child.depth(), vec![1, 2, 0]);
    assert_eq!(child.label(), parent.label());
    assert_ne!(child, parent);
    assert_eq!(child.clone(), child);
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn labels_prefix_lines() {
    let sink = Arc::new(InMemorySink::new());
    let logger = ScopeLogger::new("net", crate::indent::space_indent("-"), sink.clone());
    logger.log("a:").unwrap();
    logger.log("b").unwrap();
    assert_eq!(sink.lines(), vec!["[net] a", "[net] -b"]);
    assert_eq!(logger.to_string(), "[net] [1, 1]");
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn guard_restores_and_closes() {
    let sink = Arc::new(InMemorySink::new());
    let _root = numbered(&sink).install();
    let before = ScopeLogger::current();

    let child = crate::log("outer").unwrap();
    let guard = child.clone().enter();
    assert_eq!(ScopeLogger::current(), child);
    crate::log("inner").unwrap();
    assert_eq!(child.depth(), vec![1, 1]);
    guard.exit().unwrap();

    assert_eq!(ScopeLogger::current(), before);
    assert_eq!(child.depth(), vec![1]);
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn guard_exit_reports_underflow() {
    let sink = Arc::new(InMemorySink::new());
    let _root = numbered(&sink).install();
    let before = ScopeLogger::current();

    let fresh = numbered(&sink);
    let err = fresh.enter().exit().unwrap_err();
    assert!(err.is_underflow());
    //the ambient logger is restored regardless
    assert_eq!(ScopeLogger::current(), before);
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn ambient_survives_a_panic() {
    let sink = Arc::new(InMemorySink::new());
    let _root = numbered(&sink).install();
    let before = ScopeLogger::current();

    let r = std::panic::catch_unwind(|| {
        let child = crate::log("doomed").unwrap();
        let _guard = child.enter();
        crate::log("about to fail").unwrap();
        panic!("boom");
    });
    assert!(r.is_err());
    assert_eq!(ScopeLogger::current(), before);

    crate::log("after").unwrap();
    assert_eq!(sink.drain_logs(), "1. doomed\n1. 1. about to fail\n2. after");
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn threads_have_separate_ambient_loggers() {
    use std::sync::Barrier;

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|label| {
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                let sink = Arc::new(InMemorySink::new());
                let root = ScopeLogger::new(label, numbered_indent(), sink.clone());
                let _root = root.clone().install();
                let child = crate::log("start").unwrap();
                let _scope = child.enter();
                barrier.wait();
                crate::log("work").unwrap();
                barrier.wait();
                assert_eq!(ScopeLogger::current().label(), label);
                sink.drain_logs()
            })
        })
        .collect();

    let logs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(logs[0], "[a] 1. start\n[a] 1. 1. work");
    assert_eq!(logs[1], "[b] 1. start\n[b] 1. 1. work");
}

/// Returns `Pending` once, waking itself.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[test_executors::async_test]
async fn scoped_future_follows_suspension() {
    let sink = Arc::new(InMemorySink::new());
    let _root = numbered(&sink).install();
    let before = ScopeLogger::current();

    let child = crate::log("task").unwrap();
    let observed = child.clone();
    child
        .scoped(async move {
            crate::log("before yield").unwrap();
            YieldOnce(false).await;
            assert_eq!(ScopeLogger::current(), observed);
            crate::log("after yield").unwrap();
        })
        .await;

    assert_eq!(ScopeLogger::current(), before);
    assert_eq!(
        sink.drain_logs(),
        "1. task\n1. 1. before yield\n1. 2. after yield"
    );
}

#[test_executors::async_test]
async fn interleaved_futures_do_not_share_scopes() {
    let sink = Arc::new(InMemorySink::new());
    let _root = numbered(&sink).install();

    let a = crate::log("a").unwrap();
    let b = crate::log("b").unwrap();
    let fa = a.clone().scoped(async {
        let inner = crate::log("a1:").unwrap();
        YieldOnce(false).await;
        crate::log("a2").unwrap();
        inner
    });
    let fb = b.clone().scoped(async {
        crate::log("b1").unwrap();
        YieldOnce(false).await;
        crate::log("b2").unwrap();
    });
    let (_, ()) = futures::future::join(fa, fb).await;

    let lines = sink.lines();
    assert_eq!(&lines[..2], &["1. a", "2. b"]);
    let rest = &lines[2..];
    assert!(rest.contains(&"1. 1. a1".to_string()));
    assert!(rest.contains(&"1. 1. 1. a2".to_string()));
    assert!(rest.contains(&"2. 1. b1".to_string()));
    assert!(rest.contains(&"2. 2. b2".to_string()));
    //each scope closed its own level on completion
    assert_eq!(a.depth(), vec![1, 1]);
    assert_eq!(b.depth(), vec![2]);
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn dropping_a_scoped_future_closes_its_level() {
    use std::task::Waker;

    let sink = Arc::new(InMemorySink::new());
    let _root = numbered(&sink).install();
    let before = ScopeLogger::current();

    let child = crate::log("cancelled").unwrap();
    let mut fut = Box::pin(child.clone().scoped(async {
        crate::log("started").unwrap();
        YieldOnce(false).await;
        crate::log("never").unwrap();
    }));
    let mut cx = Context::from_waker(Waker::noop());
    assert!(fut.as_mut().poll(&mut cx).is_pending());
    assert_eq!(ScopeLogger::current(), before);
    assert_eq!(child.depth(), vec![1, 1]);

    drop(fut);
    assert_eq!(child.depth(), vec![1]);
    assert_eq!(sink.drain_logs(), "1. cancelled\n1. 1. started");
}

#[derive(Debug)]
struct FailingSink;

impl LineSink for FailingSink {
    fn emit(&self, _line: &LogLine<'_>) -> std::io::Result<()> {
        Err(std::io::Error::other("sink closed"))
    }

    fn flush(&self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn sink_failure_skips_the_trailing_level() {
    let logger = ScopeLogger::new("", none_indent(), Arc::new(FailingSink));
    let err = logger.log("opens:").unwrap_err();
    assert!(matches!(err, ScopeError::Sink(_)));
    assert_eq!(logger.depth(), vec![1]);
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn applied_future_logs_where_it_was_created() {
    let sink = Arc::new(InMemorySink::new());
    let _root = numbered(&sink).install();
    let before = ScopeLogger::current();

    let child = crate::log("batch").unwrap();
    let scope = child.clone().enter();
    crate::log("step:").unwrap();
    let task = crate::current_logger().apply(async {
        crate::log("subtask").unwrap();
        ScopeLogger::current()
    });
    //polled on another thread, whose own ambient logger is the root
    let inside = std::thread::spawn(move || futures::executor::block_on(task))
        .join()
        .unwrap();
    assert_eq!(inside, child);
    assert_eq!(ScopeLogger::current(), child);
    assert_eq!(child.depth(), vec![1, 1, 1]);

    crate::log(":").unwrap();
    scope.exit().unwrap();
    assert_eq!(ScopeLogger::current(), before);
    assert_eq!(before.depth(), vec![1]);
    assert_eq!(
        sink.drain_logs(),
        "1. batch\n1. 1. step\n1. 1. 1. subtask"
    );
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn dropping_an_applied_future_keeps_levels() {
    use std::task::Waker;

    let sink = Arc::new(InMemorySink::new());
    let _root = numbered(&sink).install();
    let before = ScopeLogger::current();

    let child = crate::log("owner:").unwrap();
    let mut fut = Box::pin(child.clone().apply(async {
        crate::log("started").unwrap();
        YieldOnce(false).await;
        crate::log("never").unwrap();
    }));
    let mut cx = Context::from_waker(Waker::noop());
    assert!(fut.as_mut().poll(&mut cx).is_pending());
    assert_eq!(ScopeLogger::current(), before);

    drop(fut);
    assert_eq!(child.depth(), vec![1, 0, 1]);
    assert_eq!(before.depth(), vec![1, 0]);
    assert_eq!(sink.drain_logs(), "1. owner\n1. 0. 1. started");
}
