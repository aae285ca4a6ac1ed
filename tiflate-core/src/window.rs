//! Sliding window for DEFLATE decompression.
//!
//! The window is a 32 KB circular buffer that serves two purposes at once:
//! it is the history that LZ77 back-references copy from, and it is the
//! staging area for decompressed bytes the caller has not collected yet.
//!
//! ```text
//!            oldest history             pending (undrained)
//!   ┌────────────────────────────┬──────────────────────┬───────────┐
//!   │ drained, still referencable│ written, not drained │   free    │
//!   └────────────────────────────┴──────────────────────┴───────────┘
//!                                                       ^ position
//! ```
//!
//! Writes only ever land in free space, so pending bytes are never
//! overwritten before the caller drains them with
//! [`SlidingWindow::copy_output`].

use crate::cursor::BitCursor;
use crate::error::{Result, TiflateError};

/// Window size for DEFLATE (32 KB), also the maximum back-reference distance.
pub const WINDOW_SIZE: usize = 32768;

/// Mask for modular indexing; valid only because the size is a power of two.
const WINDOW_MASK: usize = WINDOW_SIZE - 1;

const _: () = assert!(WINDOW_SIZE.is_power_of_two());

/// Fixed-capacity circular output window.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    /// The underlying buffer.
    buffer: Box<[u8]>,
    /// Current write position (next byte will be written here).
    position: usize,
    /// Bytes written but not yet drained.
    pending: usize,
    /// Bytes available as back-reference history (up to capacity).
    history: usize,
}

impl SlidingWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self {
            buffer: vec![0; WINDOW_SIZE].into_boxed_slice(),
            position: 0,
            pending: 0,
            history: 0,
        }
    }

    /// Get the capacity of the window.
    pub fn capacity(&self) -> usize {
        WINDOW_SIZE
    }

    /// Number of bytes written but not yet drained.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Number of bytes that can be written before the window must be drained.
    pub fn free(&self) -> usize {
        WINDOW_SIZE - self.pending
    }

    /// Number of bytes a back-reference may reach.
    pub fn history_len(&self) -> usize {
        self.history
    }

    /// Check whether nothing has been written or preloaded.
    pub fn is_empty(&self) -> bool {
        self.history == 0 && self.pending == 0
    }

    /// Get the current write position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Clear the window for a new stream without reallocating.
    pub fn reset(&mut self) {
        self.position = 0;
        self.pending = 0;
        self.history = 0;
    }

    #[inline]
    fn advance(&mut self, count: usize) {
        self.position = (self.position + count) & WINDOW_MASK;
        self.pending += count;
        self.history = (self.history + count).min(WINDOW_SIZE);
    }

    /// Append one literal byte.
    #[inline]
    pub fn write(&mut self, byte: u8) -> Result<()> {
        if self.pending >= WINDOW_SIZE {
            return Err(TiflateError::capacity("write", 1, 0));
        }

        self.buffer[self.position] = byte;
        self.advance(1);
        Ok(())
    }

    /// Read a byte at the given distance behind the write position.
    ///
    /// Distance 1 is the most recently written byte.
    pub fn read_at_distance(&self, distance: usize) -> Result<u8> {
        if distance == 0 || distance > self.history {
            return Err(TiflateError::invalid_distance(distance, self.history));
        }

        Ok(self.buffer[self.position.wrapping_sub(distance) & WINDOW_MASK])
    }

    /// Copy `length` bytes starting `distance` bytes back (an LZ77 match).
    ///
    /// When `distance < length` the source overlaps the bytes being written,
    /// and the copy proceeds forward so that freshly written bytes feed the
    /// rest of the match (`distance == 1` repeats the last byte).
    pub fn repeat(&mut self, length: usize, distance: usize) -> Result<()> {
        if distance == 0 || distance > self.history {
            return Err(TiflateError::invalid_distance(distance, self.history));
        }
        if length > self.free() {
            return Err(TiflateError::capacity("repeat", length, self.free()));
        }

        let src = self.position.wrapping_sub(distance) & WINDOW_MASK;
        let dst = self.position;

        if distance >= length && src + length <= WINDOW_SIZE && dst + length <= WINDOW_SIZE {
            self.buffer.copy_within(src..src + length, dst);
        } else {
            let mut src = src;
            let mut dst = dst;
            for _ in 0..length {
                self.buffer[dst] = self.buffer[src];
                src = (src + 1) & WINDOW_MASK;
                dst = (dst + 1) & WINDOW_MASK;
            }
        }

        self.advance(length);
        Ok(())
    }

    /// Copy up to `length` raw bytes from a byte-aligned cursor.
    ///
    /// The copy is capped by free window space and by the bytes the cursor
    /// holds. Returns the number of bytes actually copied.
    pub fn copy_stored<C: BitCursor + ?Sized>(&mut self, cursor: &mut C, length: usize) -> usize {
        let wanted = length.min(self.free()).min(cursor.available_bytes());
        let mut copied = 0;

        while copied < wanted {
            let end = (self.position + (wanted - copied)).min(WINDOW_SIZE);
            let n = cursor.copy_bytes(&mut self.buffer[self.position..end]);
            if n == 0 {
                break;
            }
            self.advance(n);
            copied += n;
        }

        copied
    }

    /// Preload a preset dictionary as history.
    ///
    /// Only the trailing [`WINDOW_SIZE`] bytes of a longer dictionary are
    /// kept. Dictionary bytes are history only; they are never drained as
    /// output.
    pub fn copy_dict(&mut self, dictionary: &[u8]) -> Result<()> {
        if !self.is_empty() {
            return Err(TiflateError::invalid_state(
                "dictionary must be loaded into an empty window",
            ));
        }

        let dict = &dictionary[dictionary.len().saturating_sub(WINDOW_SIZE)..];
        self.buffer[..dict.len()].copy_from_slice(dict);
        self.position = dict.len() & WINDOW_MASK;
        self.history = dict.len();
        Ok(())
    }

    /// Drain pending bytes into `dest` in FIFO order.
    ///
    /// Returns the number of bytes copied, which is the smaller of
    /// `dest.len()` and [`SlidingWindow::pending`].
    pub fn copy_output(&mut self, dest: &mut [u8]) -> Result<usize> {
        let count = dest.len().min(self.pending);
        let start = self.position.wrapping_sub(self.pending) & WINDOW_MASK;

        let first = count.min(WINDOW_SIZE - start);
        dest[..first].copy_from_slice(&self.buffer[start..start + first]);
        dest[first..count].copy_from_slice(&self.buffer[..count - first]);

        self.pending = self
            .pending
            .checked_sub(count)
            .ok_or_else(|| TiflateError::capacity("copy_output", count, self.pending))?;
        Ok(count)
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new()
    }
}
