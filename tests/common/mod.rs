//! Shared test helpers for steplog tests.
//!
//! This module provides common utilities used across test files to reduce
//! duplication and ensure consistent test behavior.

// Allow dead code since not all test files use all helpers
#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};

use steplog::{Channel, LogSink, MemorySink, Mode};

// =============================================================================
// ANSI Stripping
// =============================================================================

/// Strip ANSI escape codes for content verification in tests.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                // Skip until we hit a letter (the terminator)
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

// =============================================================================
// Channels and sinks
// =============================================================================

/// A color-disabled channel over a fresh memory sink. The test thread is
/// not registered, so spawned workers get ordinals from 0.
pub fn plain_channel(mode: Mode) -> (Arc<MemorySink>, Arc<Channel>) {
    let sink = Arc::new(MemorySink::new());
    let channel = Channel::builder(sink.clone())
        .color_enabled(false)
        .mode(mode)
        .register_creator(false)
        .build();
    (sink, Arc::new(channel))
}

/// Sink that fails every write after the first `ok_writes`.
pub struct FailingSink {
    ok_writes: usize,
    writes: AtomicUsize,
    pub inner: MemorySink,
}

impl FailingSink {
    pub fn new(ok_writes: usize) -> Self {
        Self {
            ok_writes,
            writes: AtomicUsize::new(0),
            inner: MemorySink::new(),
        }
    }

    pub fn attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl LogSink for FailingSink {
    fn write_str(&self, text: &str) -> io::Result<()> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst);
        if n < self.ok_writes {
            self.inner.write_str(text)
        } else {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }
    }
}

// =============================================================================
// Thread helpers
// =============================================================================

/// Spawn `count` workers that register on `channel` strictly in index
/// order, then run `body(index)`. Worker `i` gets the ordinal right after
/// worker `i - 1`. Registration is complete when this returns.
pub fn spawn_registered<F>(channel: &Arc<Channel>, count: usize, body: F) -> Vec<JoinHandle<()>>
where
    F: Fn(usize) + Send + Sync + 'static,
{
    let body = Arc::new(body);
    let base = channel.registered_threads();
    let mut handles = Vec::with_capacity(count);
    for index in 0..count {
        let (tx, rx) = mpsc::channel();
        let channel = channel.clone();
        let body = body.clone();
        handles.push(thread::spawn(move || {
            let ordinal = channel.register_calling_thread();
            tx.send(ordinal).unwrap();
            body(index);
        }));
        let ordinal = rx.recv().unwrap();
        assert_eq!(ordinal, Some(base + index), "worker {index} registered out of order");
    }
    handles
}

pub fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        handle.join().unwrap();
    }
}
