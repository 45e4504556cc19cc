//! Multi-threaded behavior of buffered and direct channels.
//!
//! Run with: `cargo test --test concurrent_channels`

mod common;

use common::{FailingSink, join_all, plain_channel, spawn_registered, strip_ansi};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use steplog::{Channel, Directive, Error, LogColor, MemorySink, Mode};

// =============================================================================
// Ordering
// =============================================================================

/// Expected flush output when worker `i` wrote `messages` lines tagged `i`.
fn expected_lines(workers: usize, messages: usize) -> String {
    let mut expected = String::new();
    for worker in 0..workers {
        for message in 0..messages {
            expected.push_str(&format!("[w{worker}] msg {message}\n"));
        }
    }
    expected
}

#[test]
fn test_flush_concatenates_in_ordinal_order_for_many_thread_counts() {
    for workers in [1usize, 2, 5, 16] {
        let messages = 20;
        let (sink, channel) = plain_channel(Mode::Buffered);
        let start = Arc::new(Barrier::new(workers));

        let writer = channel.clone();
        let gate = start.clone();
        let handles = spawn_registered(&channel, workers, move |index| {
            gate.wait();
            for message in 0..messages {
                writer
                    .prefixed(format!("w{index}"))
                    .write("msg ")
                    .write(message)
                    .endl();
                if message % 7 == index % 7 {
                    thread::yield_now();
                }
            }
        });
        join_all(handles);

        channel.flush().unwrap();
        assert_eq!(sink.contents(), expected_lines(workers, messages), "{workers} workers");
    }
}

#[test]
fn test_completion_order_does_not_matter() {
    let workers = 4;
    let (sink, channel) = plain_channel(Mode::Buffered);

    // Lowest ordinal sleeps longest, so workers finish in reverse order.
    let writer = channel.clone();
    let handles = spawn_registered(&channel, workers, move |index| {
        thread::sleep(Duration::from_millis(((workers - index) * 15) as u64));
        writer.write(index);
    });
    join_all(handles);

    channel.flush().unwrap();
    assert_eq!(sink.contents(), "0123");
}

#[test]
fn test_step_barrier_flushes_each_step() {
    let workers = 3;
    let steps = 4;
    let (sink, channel) = plain_channel(Mode::Buffered);
    channel.register_calling_thread();
    let barrier = Arc::new(Barrier::new(workers + 1));

    let writer = channel.clone();
    let step_barrier = barrier.clone();
    let handles = spawn_registered(&channel, workers, move |index| {
        for step in 0..steps {
            writer.write(format_args!("s{step}w{index} "));
            step_barrier.wait();
            step_barrier.wait();
        }
    });

    let mut per_step = Vec::new();
    for step in 0..steps {
        channel.write(format_args!("s{step}main "));
        barrier.wait();
        channel.flush().unwrap();
        per_step.push(sink.take());
        barrier.wait();
    }
    join_all(handles);

    for (step, chunk) in per_step.iter().enumerate() {
        let mut expected = format!("s{step}main ");
        for index in 0..workers {
            expected.push_str(&format!("s{step}w{index} "));
        }
        assert_eq!(chunk, &expected);
    }
}

#[test]
fn test_writes_during_flush_are_not_lost() {
    let workers = 4;
    let per_worker = 500;
    let (sink, channel) = plain_channel(Mode::Buffered);

    let writer = channel.clone();
    let handles = spawn_registered(&channel, workers, move |_| {
        for _ in 0..per_worker {
            writer.write("x");
        }
    });

    // Flush concurrently with the writers; nothing may be dropped.
    for _ in 0..50 {
        channel.flush().unwrap();
        thread::yield_now();
    }
    join_all(handles);
    channel.flush().unwrap();

    assert_eq!(sink.contents().len(), workers * per_worker);
}

#[test]
fn test_colored_items_stay_intact_across_threads() {
    let sink = Arc::new(MemorySink::new());
    let channel = Arc::new(
        Channel::builder(sink.clone())
            .color(LogColor::info())
            .register_creator(false)
            .build(),
    );

    let writer = channel.clone();
    let handles = spawn_registered(&channel, 3, move |index| {
        writer.write(index).endl();
    });
    join_all(handles);
    channel.flush().unwrap();

    let contents = sink.contents();
    assert_eq!(
        contents,
        "\x1b[1;32m0\x1b[0m\n\x1b[1;32m1\x1b[0m\n\x1b[1;32m2\x1b[0m\n"
    );
    assert_eq!(strip_ansi(&contents), "0\n1\n2\n");
}

#[test]
fn test_width_directive_is_thread_local() {
    let (sink, channel) = plain_channel(Mode::Buffered);
    let writer = channel.clone();
    let handles = spawn_registered(&channel, 2, move |index| {
        if index == 0 {
            writer.write_raw(Directive::Width(3));
        }
        writer.write(index).write("|");
    });
    join_all(handles);
    channel.flush().unwrap();
    assert_eq!(sink.contents(), "  0|1|");
}

// =============================================================================
// Direct mode
// =============================================================================

#[test]
fn test_direct_mode_writes_every_item() {
    let (sink, channel) = plain_channel(Mode::Direct);
    let writer = channel.clone();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let writer = writer.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    writer.write("ab");
                }
            })
        })
        .collect();
    join_all(handles);

    let contents = sink.contents();
    assert_eq!(contents.len(), 800);
    // Items are written whole: no "a" is ever separated from its "b".
    assert_eq!(contents.matches("ab").count(), 400);
    channel.flush().unwrap();
    assert_eq!(sink.contents().len(), 800);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_buffered_flush_stops_writing_after_first_failure() {
    let sink = Arc::new(FailingSink::new(1));
    let channel = Arc::new(
        Channel::builder(sink.clone())
            .color_enabled(false)
            .register_creator(false)
            .build(),
    );
    let writer = channel.clone();
    let handles = spawn_registered(&channel, 3, move |index| {
        writer.write(index);
    });
    join_all(handles);

    let err = channel.flush().unwrap_err();
    assert!(matches!(err, Error::Sink(_)));
    assert_eq!(sink.inner.contents(), "0");
    assert_eq!(sink.attempts(), 2, "not retried, nothing written after the failure");

    channel.flush().unwrap();
    assert_eq!(sink.attempts(), 2);
}
