//! Target sinks for channel output.
//!
//! A sink is the external text stream a [`Channel`](crate::Channel) writes
//! to. Channels hold sinks by `Arc`, so the same sink can be inspected by
//! whoever created it.
//!
//! # Usage
//!
//! ```
//! use steplog::{Channel, LogColor, MemorySink, Mode};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let channel = Channel::new(sink.clone(), LogColor::info(), Mode::Direct);
//! channel.disable_color();
//! channel.write("hi");
//! assert_eq!(sink.contents(), "hi");
//! ```

use std::io::{self, Write};

use parking_lot::Mutex;

/// Trait for the text streams channels write to.
///
/// Implementations must serialize their own writes: in direct mode several
/// threads call `write_str` concurrently.
pub trait LogSink: Send + Sync {
    /// Write a chunk of already-rendered text.
    fn write_str(&self, text: &str) -> io::Result<()>;
    /// Push any buffered bytes to the underlying stream.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Process standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_str(&self, text: &str) -> io::Result<()> {
        io::stdout().lock().write_all(text.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

/// Process standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write_str(&self, text: &str) -> io::Result<()> {
        io::stderr().lock().write_all(text.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        io::stderr().lock().flush()
    }
}

/// Adapts any [`Write`] (a file, a socket, a `Vec<u8>`) into a sink.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write_str(&self, text: &str) -> io::Result<()> {
        self.writer.lock().write_all(text.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }
}

/// In-memory sink that keeps everything written to it.
#[derive(Debug, Default)]
pub struct MemorySink {
    text: Mutex<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> String {
        self.text.lock().clone()
    }

    /// Take everything written so far, leaving the sink empty.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.text.lock())
    }
}

impl LogSink for MemorySink {
    fn write_str(&self, text: &str) -> io::Result<()> {
        self.text.lock().push_str(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_accumulates_and_takes() {
        let sink = MemorySink::new();
        sink.write_str("a").unwrap();
        sink.write_str("b").unwrap();
        assert_eq!(sink.contents(), "ab");
        assert_eq!(sink.take(), "ab");
        assert_eq!(sink.contents(), "");
    }

    #[test]
    fn test_writer_sink_forwards_bytes() {
        let sink = WriterSink::new(Vec::new());
        sink.write_str("step 1\n").unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.into_inner(), b"step 1\n");
    }

    #[test]
    fn test_writer_sink_over_file() {
        use std::io::Read;

        let mut file = tempfile::tempfile().unwrap();
        let sink = WriterSink::new(file.try_clone().unwrap());
        sink.write_str("to disk").unwrap();
        sink.flush().unwrap();

        use std::io::Seek;
        file.rewind().unwrap();
        let mut read_back = String::new();
        file.read_to_string(&mut read_back).unwrap();
        assert_eq!(read_back, "to disk");
    }

    #[test]
    fn test_sinks_are_object_safe() {
        let sinks: Vec<Box<dyn LogSink>> = vec![
            Box::new(MemorySink::new()),
            Box::new(WriterSink::new(io::sink())),
        ];
        for sink in sinks {
            sink.write_str("x").unwrap();
            sink.flush().unwrap();
        }
    }
}
