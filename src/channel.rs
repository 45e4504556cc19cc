//! The log channel: a sink, a color, and a write strategy.
//!
//! A [`Channel`] is shared by reference between threads. Every write method
//! takes `&self` and returns `&Self`, so calls chain left to right:
//!
//! ```
//! use steplog::{Channel, LogColor, MemorySink, Mode};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let log = Channel::builder(sink.clone())
//!     .color_enabled(false)
//!     .mode(Mode::Buffered)
//!     .build();
//!
//! log.write("step ").write_num(3).endl();
//! assert_eq!(sink.contents(), "");
//!
//! log.flush().unwrap();
//! assert_eq!(sink.contents(), "step 3\n");
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::color::{LogColor, paint_into};
use crate::destination::{self, Destination, Mode};
use crate::error::{Error, Result};
use crate::format::{FormatFlags, FormatState, Manip, Numeric, Raw};
use crate::sink::LogSink;

/// An addressable log endpoint.
pub struct Channel {
    destination: Box<dyn Destination>,
    color: RwLock<LogColor>,
    color_enabled: AtomicBool,
    /// Set by [`Channel::close`]; later writes are dropped.
    closed: AtomicBool,
    /// First sink failure seen by a write, reported by the next flush.
    failure: Mutex<Option<Error>>,
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("mode", &self.mode())
            .field("color", &*self.color.read())
            .field("color_enabled", &self.is_color_enabled())
            .field("closed", &self.is_closed())
            .field("registered_threads", &self.registered_threads())
            .finish()
    }
}

impl Channel {
    /// Create a channel with color enabled.
    ///
    /// In buffered mode the calling thread is registered first, so it
    /// flushes ahead of every worker.
    pub fn new(sink: Arc<dyn LogSink>, color: LogColor, mode: Mode) -> Self {
        Self::builder(sink).color(color).mode(mode).build()
    }

    pub fn builder(sink: Arc<dyn LogSink>) -> ChannelBuilder {
        ChannelBuilder::new(sink)
    }

    // ========================================================================
    // Insertion API
    // ========================================================================

    /// Write any displayable value, colorized when color is enabled.
    ///
    /// The value is formatted before any lock is taken, so its `Display`
    /// may itself write to this channel.
    pub fn write<T: fmt::Display>(&self, value: T) -> &Self {
        if self.is_closed() {
            return self;
        }
        let text = value.to_string();
        self.content(&text)
    }

    /// Write a number, honoring the base/sign/precision flags set through
    /// [`Directive`](crate::Directive)s.
    pub fn write_num<N: Numeric>(&self, value: N) -> &Self {
        if self.is_closed() {
            return self;
        }
        let (flags, precision) = self.numeric_style();
        let text = value.render(flags, precision);
        self.content(&text)
    }

    /// Route a manipulator or directive. Never colorized.
    pub fn write_raw(&self, raw: impl Into<Raw>) -> &Self {
        if self.is_closed() {
            return self;
        }
        let result = match raw.into() {
            Raw::Directive(directive) => self
                .destination
                .append(&mut |state: &mut FormatState, _: &mut String| state.apply(directive)),
            Raw::Manip(Manip::Endl) => self
                .destination
                .append(&mut |_: &mut FormatState, out: &mut String| out.push('\n'))
                .and_then(|()| self.destination.flush_sink()),
            Raw::Manip(Manip::Flush) => self.destination.flush_sink(),
        };
        self.record(result);
        self
    }

    /// Shorthand for `write_raw(Manip::Endl)`.
    pub fn endl(&self) -> &Self {
        self.write_raw(Manip::Endl)
    }

    /// Write the conventional `"[id] "` message prefix.
    pub fn prefixed<I: fmt::Display>(&self, id: I) -> &Self {
        self.write(format_args!("[{id}] "))
    }

    /// Copy of the calling thread's numeric flags and precision.
    fn numeric_style(&self) -> (FormatFlags, Option<usize>) {
        let mut style = (FormatFlags::NONE, None);
        let result = self
            .destination
            .append(&mut |state: &mut FormatState, _: &mut String| {
                style = (state.flags(), state.precision());
            });
        self.record(result);
        style
    }

    /// Pad, paint and append text that is already rendered.
    fn content(&self, text: &str) -> &Self {
        let enabled = self.is_color_enabled();
        let color = self.color.read();
        let result = self.destination.append(&mut |state, out| {
            paint_into(out, &state.pad(text), &color, enabled);
        });
        drop(color);
        self.record(result);
        self
    }

    fn record(&self, result: Result<()>) {
        if let Err(error) = result {
            tracing::warn!(%error, "log sink write failed");
            let mut failure = self.failure.lock();
            if failure.is_none() {
                *failure = Some(error);
            }
        }
    }

    // ========================================================================
    // Flush
    // ========================================================================

    /// Drain every thread's buffer into the sink in ordinal order.
    ///
    /// In direct mode only the sink itself is flushed. Returns the first
    /// sink failure since the last flush, if any. Failed writes are not
    /// retried.
    pub fn flush(&self) -> Result<()> {
        let flushed = self.destination.flush();
        if let Err(error) = &flushed {
            tracing::warn!(%error, "log flush failed");
        }
        match self.failure.lock().take() {
            Some(earlier) => Err(earlier),
            None => flushed,
        }
    }

    /// Drop every later write. Text already buffered stays until the next
    /// [`flush`](Self::flush).
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // ========================================================================
    // Color
    // ========================================================================

    /// Wrap subsequent content writes in the channel's color.
    pub fn enable_color(&self) {
        self.color_enabled.store(true, Ordering::Relaxed);
    }

    /// Write subsequent content as plain text.
    pub fn disable_color(&self) {
        self.color_enabled.store(false, Ordering::Relaxed);
    }

    /// Whether content writes are currently colorized.
    pub fn is_color_enabled(&self) -> bool {
        self.color_enabled.load(Ordering::Relaxed)
    }

    /// The color applied to content writes.
    pub fn color(&self) -> LogColor {
        self.color.read().clone()
    }

    /// Replace the default color for subsequent writes.
    pub fn set_color(&self, color: LogColor) {
        *self.color.write() = color;
    }

    // ========================================================================
    // Threads
    // ========================================================================

    /// Register the calling thread before it logs, fixing its flush
    /// position. Returns its ordinal, or `None` in direct mode.
    pub fn register_calling_thread(&self) -> Option<usize> {
        self.destination.register_current_thread()
    }

    /// The calling thread's flush position, if it has one yet.
    pub fn ordinal_of_current_thread(&self) -> Option<usize> {
        self.destination.ordinal_of_current_thread()
    }

    /// Number of threads holding a buffer (always 0 in direct mode).
    pub fn registered_threads(&self) -> usize {
        self.destination.registered_threads()
    }

    /// The write strategy chosen at build time.
    pub fn mode(&self) -> Mode {
        self.destination.mode()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Channel`].
pub struct ChannelBuilder {
    sink: Arc<dyn LogSink>,
    color: LogColor,
    color_enabled: bool,
    mode: Mode,
    register_creator: bool,
}

impl ChannelBuilder {
    fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            color: LogColor::info(),
            color_enabled: true,
            mode: Mode::default(),
            register_creator: true,
        }
    }

    #[must_use]
    pub fn color(mut self, color: LogColor) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn color_enabled(mut self, enabled: bool) -> Self {
        self.color_enabled = enabled;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Whether the building thread takes ordinal 0 (default `true`).
    #[must_use]
    pub fn register_creator(mut self, register: bool) -> Self {
        self.register_creator = register;
        self
    }

    pub fn build(self) -> Channel {
        let destination = destination::for_mode(self.mode, self.sink);
        if self.register_creator {
            destination.register_current_thread();
        }
        Channel {
            destination,
            color: RwLock::new(self.color),
            color_enabled: AtomicBool::new(self.color_enabled),
            closed: AtomicBool::new(false),
            failure: Mutex::new(None),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
