//! Where a channel's writes land: straight in the sink, or in per-thread
//! buffers drained at flush time.
//!
//! The strategy is chosen once, when the channel is built, via [`Mode`].
//!
//! In buffered mode a single mutex guards the whole
//! [`ThreadBufferRegistry`]. Appends take it too, so a flush can never race
//! with a thread writing into the buffer being cleared. Values are formatted
//! before the lock is taken; the critical section only pads, colors and
//! pushes text that is already rendered.

use std::str::FromStr;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::format::FormatState;
use crate::registry::ThreadBufferRegistry;
use crate::sink::LogSink;

/// Write strategy of a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Per-thread buffers, serialized into the sink in ordinal order on flush.
    #[default]
    Buffered,
    /// Every write goes to the sink immediately.
    Direct,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self> {
        match src.trim().to_ascii_lowercase().as_str() {
            "buffered" | "threadsafe" => Ok(Mode::Buffered),
            "direct" => Ok(Mode::Direct),
            _ => Err(Error::UnknownMode(src.to_string())),
        }
    }
}

/// Appends one item to a destination: receives the destination's
/// formatting state and the string to append to. Runs under the
/// destination's lock, so it must not write to a channel.
pub type Render<'a> = &'a mut dyn FnMut(&mut FormatState, &mut String);

/// Trait implemented by the two write strategies.
pub trait Destination: Send + Sync {
    fn mode(&self) -> Mode;

    /// Render an item into the calling thread's destination.
    fn append(&self, render: Render<'_>) -> Result<()>;

    /// Move pending text into the sink and flush the sink.
    fn flush(&self) -> Result<()>;

    /// Flush the sink's own buffering, as requested by a manipulator.
    fn flush_sink(&self) -> Result<()>;

    /// Register the calling thread. `None` when the strategy has no
    /// per-thread state.
    fn register_current_thread(&self) -> Option<usize>;

    fn ordinal_of_current_thread(&self) -> Option<usize>;

    /// Number of threads with a buffer.
    fn registered_threads(&self) -> usize;
}

// ============================================================================
// Direct
// ============================================================================

/// Writes reach the sink immediately. The single formatting state is shared
/// by all writers, like a process-wide stream.
pub struct Direct {
    sink: Arc<dyn LogSink>,
    format: Mutex<FormatState>,
}

impl Direct {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            format: Mutex::new(FormatState::default()),
        }
    }
}

impl Destination for Direct {
    fn mode(&self) -> Mode {
        Mode::Direct
    }

    fn append(&self, render: Render<'_>) -> Result<()> {
        let mut text = String::new();
        render(&mut self.format.lock(), &mut text);
        if text.is_empty() {
            return Ok(());
        }
        self.sink.write_str(&text)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.flush_sink()
    }

    fn flush_sink(&self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    fn register_current_thread(&self) -> Option<usize> {
        None
    }

    fn ordinal_of_current_thread(&self) -> Option<usize> {
        None
    }

    fn registered_threads(&self) -> usize {
        0
    }
}

// ============================================================================
// Buffered
// ============================================================================

/// Writes accumulate in the calling thread's buffer until [`flush`].
///
/// [`flush`]: Destination::flush
pub struct Buffered {
    sink: Arc<dyn LogSink>,
    registry: Mutex<ThreadBufferRegistry>,
}

impl Buffered {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            registry: Mutex::new(ThreadBufferRegistry::new()),
        }
    }

    /// Bytes waiting for the next flush, across all threads.
    pub fn pending_bytes(&self) -> usize {
        self.registry.lock().pending_bytes()
    }
}

impl Destination for Buffered {
    fn mode(&self) -> Mode {
        Mode::Buffered
    }

    fn append(&self, render: Render<'_>) -> Result<()> {
        let mut registry = self.registry.lock();
        let (format, text) = registry.buffer_for(thread::current().id()).parts_mut();
        render(format, text);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut registry = self.registry.lock();
        registry.for_each_in_order(|text| self.sink.write_str(text))?;
        self.sink.flush()?;
        Ok(())
    }

    /// Buffered text only leaves through [`Destination::flush`].
    fn flush_sink(&self) -> Result<()> {
        Ok(())
    }

    fn register_current_thread(&self) -> Option<usize> {
        Some(self.registry.lock().ensure_registered(thread::current().id()))
    }

    fn ordinal_of_current_thread(&self) -> Option<usize> {
        self.registry.lock().ordinal_of(thread::current().id())
    }

    fn registered_threads(&self) -> usize {
        self.registry.lock().len()
    }
}

/// Build the destination for `mode` over `sink`.
pub fn for_mode(mode: Mode, sink: Arc<dyn LogSink>) -> Box<dyn Destination> {
    match mode {
        Mode::Buffered => Box::new(Buffered::new(sink)),
        Mode::Direct => Box::new(Direct::new(sink)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn push(text: &'static str) -> impl FnMut(&mut FormatState, &mut String) {
        move |_, out| out.push_str(text)
    }

    #[test]
    fn test_direct_writes_immediately() {
        let sink = Arc::new(MemorySink::new());
        let direct = Direct::new(sink.clone());
        direct.append(&mut push("hi")).unwrap();
        assert_eq!(sink.contents(), "hi");
        direct.flush().unwrap();
        assert_eq!(sink.contents(), "hi");
        assert_eq!(direct.register_current_thread(), None);
    }

    #[test]
    fn test_buffered_holds_until_flush() {
        let sink = Arc::new(MemorySink::new());
        let buffered = Buffered::new(sink.clone());
        buffered.append(&mut push("hi")).unwrap();
        assert_eq!(sink.contents(), "");
        assert_eq!(buffered.pending_bytes(), 2);

        buffered.flush_sink().unwrap();
        assert_eq!(sink.contents(), "");

        buffered.flush().unwrap();
        assert_eq!(sink.contents(), "hi");
        assert_eq!(buffered.pending_bytes(), 0);
    }

    #[test]
    fn test_buffered_registration_is_per_thread() {
        let buffered = Arc::new(Buffered::new(Arc::new(MemorySink::new())));
        assert_eq!(buffered.ordinal_of_current_thread(), None);
        assert_eq!(buffered.register_current_thread(), Some(0));
        assert_eq!(buffered.register_current_thread(), Some(0));

        let other = buffered.clone();
        let ordinal = thread::spawn(move || other.register_current_thread())
            .join()
            .unwrap();
        assert_eq!(ordinal, Some(1));
        assert_eq!(buffered.registered_threads(), 2);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Buffered".parse::<Mode>().unwrap(), Mode::Buffered);
        assert_eq!(" direct ".parse::<Mode>().unwrap(), Mode::Direct);
        assert!(matches!(
            "async".parse::<Mode>(),
            Err(Error::UnknownMode(m)) if m == "async"
        ));
    }

    #[test]
    fn test_for_mode_selects_strategy() {
        let sink: Arc<dyn LogSink> = Arc::new(MemorySink::new());
        assert_eq!(for_mode(Mode::Direct, sink.clone()).mode(), Mode::Direct);
        assert_eq!(for_mode(Mode::Buffered, sink).mode(), Mode::Buffered);
    }
}
