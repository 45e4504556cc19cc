//! Deterministic, colorized log channels for multi-threaded simulations.
//!
//! steplog gives a simulation two shared text channels (normal output and
//! errors) that many worker threads write to at once. In buffered mode each
//! thread writes into its own buffer; at a barrier the host calls `flush`
//! and every buffer is written to the sink in thread-registration order, so
//! the rendered output does not depend on scheduling.
//!
//! # Modules
//!
//! - [`channel`] - The `Channel` and its fluent insertion API
//! - [`color`] - Color markers and the `LogColor` type
//! - [`format`] - Manipulators, field width and numeric flags
//! - [`registry`] - Per-thread buffers indexed by registration ordinal
//! - [`destination`] - Buffered and direct write strategies
//! - [`sink`] - `LogSink` trait and standard sinks
//! - [`service`] - The process-wide channel pair and ambient macros
//! - [`config`] - `LogConfig`

#[macro_use]
mod macros;

pub mod channel;
pub mod color;
pub mod config;
pub mod destination;
pub mod error;
pub mod format;
pub mod registry;
pub mod service;
pub mod sink;

// Re-export commonly used types
pub use channel::{Channel, ChannelBuilder};
pub use color::{Attribute, LogColor, colorize};
pub use config::LogConfig;
pub use destination::Mode;
pub use error::{Error, Result};
pub use format::{Directive, FormatFlags, MAX_WIDTH, Manip, Numeric, Raw};
pub use service::{LogService, current, init, install, shutdown};
pub use sink::{LogSink, MemorySink, StderrSink, StdoutSink, WriterSink};
