//! Per-thread text buffers indexed by registration ordinal.
//!
//! The registry is a plain data structure: it holds no lock of its own.
//! The owning [`Buffered`](crate::destination::Buffered) destination keeps
//! it behind a mutex that every append, registration and flush takes.

use std::collections::HashMap;
use std::thread::ThreadId;

use crate::format::FormatState;

/// One thread's pending text and formatting state.
#[derive(Debug, Default)]
pub struct ThreadBuffer {
    text: String,
    format: FormatState,
}

impl ThreadBuffer {
    /// Append already-rendered text.
    pub fn push(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Text written since the last flush.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// This thread's formatting state, for directives.
    pub fn format_mut(&mut self) -> &mut FormatState {
        &mut self.format
    }

    /// Split borrow used by the write path: pad with the format state
    /// straight into the text.
    pub fn parts_mut(&mut self) -> (&mut FormatState, &mut String) {
        (&mut self.format, &mut self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Maps threads to ordinals and owns one [`ThreadBuffer`] per ordinal.
///
/// Ordinals are contiguous from 0, assigned in first-contact order and
/// never reassigned. Slots are never removed.
#[derive(Debug, Default)]
pub struct ThreadBufferRegistry {
    ordinals: HashMap<ThreadId, usize>,
    buffers: Vec<ThreadBuffer>,
}

impl ThreadBufferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the ordinal of `thread`, assigning the next one (and a fresh
    /// buffer) on first contact.
    pub fn ensure_registered(&mut self, thread: ThreadId) -> usize {
        if let Some(&ordinal) = self.ordinals.get(&thread) {
            return ordinal;
        }
        let ordinal = self.buffers.len();
        self.ordinals.insert(thread, ordinal);
        self.buffers.push(ThreadBuffer::default());
        tracing::debug!(ordinal, ?thread, "registered log thread");
        ordinal
    }

    pub fn ordinal_of(&self, thread: ThreadId) -> Option<usize> {
        self.ordinals.get(&thread).copied()
    }

    /// The caller's own buffer, registering `thread` if needed.
    pub fn buffer_for(&mut self, thread: ThreadId) -> &mut ThreadBuffer {
        let ordinal = self.ensure_registered(thread);
        &mut self.buffers[ordinal]
    }

    /// Visit every buffer in ordinal order, handing its text to `visitor`
    /// and clearing it.
    ///
    /// Every buffer is cleared even if the visitor fails. The visitor is not
    /// called again after its first error, which is returned.
    pub fn for_each_in_order<E, F>(&mut self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&str) -> Result<(), E>,
    {
        let mut outcome = Ok(());
        for buffer in &mut self.buffers {
            if outcome.is_ok() && !buffer.text.is_empty() {
                outcome = visitor(&buffer.text);
            }
            buffer.text.clear();
        }
        outcome
    }

    /// Number of registered threads.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Total bytes waiting for the next flush.
    pub fn pending_bytes(&self) -> usize {
        self.buffers.iter().map(|b| b.text.len()).sum()
    }
}
