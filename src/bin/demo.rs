//! Demo binary for steplog E2E testing.
//!
//! This binary drives the ambient channel pair from worker threads the way
//! a simulation loop would. Each subcommand demonstrates a specific feature.

use std::env;
use std::process::ExitCode;
use std::sync::{Arc, Barrier, mpsc};
use std::thread;

use steplog::{Directive, FormatFlags, LogConfig, LogService, Mode, log_errln, log_outln, tagged_out};
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!("Usage: steplog-demo <command> [args...]");
    eprintln!("Commands:");
    eprintln!("  workers <count> <steps>   buffered workers flushed at each step");
    eprintln!("  reverse                   late registrant finishes first");
    eprintln!("  direct <message>          direct mode, no flush");
    eprintln!("  plain <message>           color disabled");
    eprintln!("  error <message>           write to the error channel");
    eprintln!("  table                     width and numeric flags");
    eprintln!("  config <json>             channels built from a JSON config");
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("steplog-demo: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> steplog::Result<()> {
    let arg = |i: usize, default: &'static str| -> String {
        args.get(i).cloned().unwrap_or_else(|| default.to_string())
    };

    match args[1].as_str() {
        "workers" => {
            let count: usize = arg(2, "3").parse().unwrap_or(3);
            let steps: usize = arg(3, "2").parse().unwrap_or(2);
            let logs = steplog::init(&LogConfig::from_env()?)?;
            run_workers(&logs, count, steps)?;
        }

        "reverse" => {
            // Thread A registers first, thread B writes first.
            let logs = steplog::init(&LogConfig::from_env()?)?;
            let (registered_tx, registered_rx) = mpsc::channel();
            let (written_tx, written_rx) = mpsc::channel();
            let a = {
                let logs = logs.clone();
                thread::spawn(move || {
                    logs.register_calling_thread();
                    let _ = registered_tx.send(());
                    let _ = written_rx.recv();
                    logs.out().write("A wrote second").endl();
                })
            };
            let b = {
                let logs = logs.clone();
                thread::spawn(move || {
                    let _ = registered_rx.recv();
                    logs.out().write("B wrote first").endl();
                    let _ = written_tx.send(());
                })
            };
            let _ = a.join();
            let _ = b.join();
            logs.flush()?;
        }

        "direct" => {
            let config = LogConfig {
                mode: Mode::Direct,
                ..LogConfig::from_env()?
            };
            steplog::init(&config)?;
            log_outln!(arg(2, "hello"));
            // Nothing is flushed explicitly: direct writes are already out.
            std::process::exit(0);
        }

        "plain" => {
            let logs = steplog::init(&LogConfig::from_env()?)?;
            logs.set_color_enabled(false);
            log_outln!(arg(2, "plain text"));
        }

        "error" => {
            steplog::init(&LogConfig::from_env()?)?;
            log_errln!("error: ", arg(2, "something failed"));
        }

        "table" => {
            let logs = steplog::init(&LogConfig::from_env()?)?;
            let out = logs.out();
            out.write_raw(Directive::SetFlags(FormatFlags::LEFT))
                .write_raw(Directive::Width(8))
                .write("id")
                .write_raw(Directive::UnsetFlags(FormatFlags::LEFT))
                .write_raw(Directive::Width(6))
                .write("hex")
                .endl();
            for id in [7u32, 42, 255] {
                out.write_raw(Directive::SetFlags(FormatFlags::LEFT))
                    .write_raw(Directive::Width(8))
                    .write_num(id)
                    .write_raw(Directive::UnsetFlags(FormatFlags::LEFT))
                    .write_raw(Directive::SetFlags(FormatFlags::HEX | FormatFlags::SHOW_BASE))
                    .write_raw(Directive::Width(6))
                    .write_num(id)
                    .write_raw(Directive::UnsetFlags(FormatFlags::HEX | FormatFlags::SHOW_BASE))
                    .endl();
            }
        }

        "config" => {
            let config = LogConfig::from_json_str(&arg(2, "{}"))?;
            let logs = Arc::new(LogService::standard(&config));
            steplog::install(logs)?;
            log_outln!("mode=", format!("{:?}", config.mode));
        }

        other => {
            eprintln!("Unknown command: {other}");
            usage();
            std::process::exit(1);
        }
    }

    steplog::shutdown()
}

/// One thread per controller. Workers register in index order, write during
/// each step, and the main thread flushes at the step barrier.
fn run_workers(logs: &Arc<LogService>, count: usize, steps: usize) -> steplog::Result<()> {
    let barrier = Arc::new(Barrier::new(count + 1));
    let mut handles = Vec::with_capacity(count);

    for index in 0..count {
        let (registered_tx, registered_rx) = mpsc::channel();
        let logs = logs.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            logs.register_calling_thread();
            let _ = registered_tx.send(());
            let id = format!("ctrl{index}");
            for step in 0..steps {
                // Later controllers tend to finish first; order must not care.
                thread::sleep(std::time::Duration::from_millis(((count - index) * 3) as u64));
                tagged_out!(&id, "step ", step);
                barrier.wait();
                barrier.wait();
            }
        }));
        let _ = registered_rx.recv();
    }

    for step in 0..steps {
        log_outln!("== step ", step);
        barrier.wait();
        logs.flush()?;
        barrier.wait();
    }

    for handle in handles {
        let _ = handle.join();
    }
    Ok(())
}
