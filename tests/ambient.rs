// SPDX-License-Identifier: MIT OR Apache-2.0

use scopelog::{InMemorySink, ScopeLogger, numbered_indent, root_logger, set_root_logger};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

static TEST_ROOT_GUARD: Mutex<()> = Mutex::new(());

#[test]
fn fresh_threads_start_at_the_root() {
    let _guard = TEST_ROOT_GUARD.lock().unwrap();
    let sink = Arc::new(InMemorySink::new());
    let root = ScopeLogger::new("GLOBAL", numbered_indent(), sink.clone());
    let original = set_root_logger(root.clone());

    let seen = thread::spawn(scopelog::current_logger).join().unwrap();
    set_root_logger(original);
    assert_eq!(seen, root);
}

#[test]
fn root_counters_are_shared_between_threads() {
    let _guard = TEST_ROOT_GUARD.lock().unwrap();
    let sink = Arc::new(InMemorySink::new());
    let root = ScopeLogger::new("GLOBAL", numbered_indent(), sink.clone());
    let original = set_root_logger(root.clone());

    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..25 {
                    scopelog::log("tick").unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    set_root_logger(original);

    assert_eq!(root.depth(), vec![100]);
    let lines = sink.lines();
    assert_eq!(lines.len(), 100);
    //every counter value is handed out exactly once
    let mut numbers: Vec<u32> = lines
        .iter()
        .map(|l| {
            l.trim_start_matches("[GLOBAL] ")
                .split('.')
                .next()
                .unwrap()
                .parse()
                .unwrap()
        })
        .collect();
    numbers.sort();
    assert_eq!(numbers, (1..=100).collect::<Vec<u32>>());
}

#[test]
fn scopes_stay_on_their_thread() {
    let sink = Arc::new(InMemorySink::new());
    let _root = ScopeLogger::new("main", numbered_indent(), sink.clone()).install();
    let child = scopelog::log("spawning").unwrap();
    let _scope = child.clone().enter();

    let other = thread::spawn(|| scopelog::current_logger()).join().unwrap();
    assert_ne!(other, child);
    assert_eq!(other.nesting_level(), 0);
    assert_eq!(scopelog::current_logger(), child);
    assert_ne!(root_logger(), child);
}

#[test]
fn handing_a_logger_to_a_worker() {
    let sink = Arc::new(InMemorySink::new());
    let _root = ScopeLogger::new("", numbered_indent(), sink.clone()).install();
    let child = scopelog::log("dispatch:").unwrap();

    thread::spawn(move || {
        let _scope = child.enter();
        scopelog::log("worker").unwrap();
    })
    .join()
    .unwrap();
    scopelog::log(":joined").unwrap();

    assert_eq!(sink.drain_logs(), "1. dispatch\n1. 0. 1. worker\n1. joined");
}
