//! Bit-level input cursor for DEFLATE decoding.
//!
//! [`BitCursor`] is the contract the Huffman decoder, the sliding window and
//! the inflate engine consume. It never blocks and never pulls from an
//! outside source: it answers from what has already been handed to it, and
//! reports a shortfall with `None` so the caller can suspend and retry once
//! more input arrives.
//!
//! [`StreamCursor`] is an owning implementation fed incrementally with
//! [`StreamCursor::push_input`].
//!
//! # Bit Ordering
//!
//! DEFLATE packs bits LSB-first within each byte, so the first bit of the
//! stream is bit 0 of the first byte.
//!
//! # Example
//!
//! ```
//! use tiflate_core::cursor::{BitCursor, StreamCursor};
//!
//! let mut cursor = StreamCursor::new(vec![0xAB]);
//! assert_eq!(cursor.peek_bits(4), Some(0xB));
//! cursor.drop_bits(4);
//! assert_eq!(cursor.peek_bits(4), Some(0xA));
//! assert_eq!(cursor.peek_bits(5), None); // only 4 bits left
//! ```

/// Largest bit count a single [`BitCursor::peek_bits`] call may request.
pub const MAX_PEEK_BITS: u8 = 16;

/// Source of bits and byte-aligned bytes for a decoder.
pub trait BitCursor {
    /// Return the next `count` bits (LSB-first) without consuming them.
    ///
    /// `count` must be at most [`MAX_PEEK_BITS`]. Returns `None` when fewer
    /// than `count` bits are available.
    fn peek_bits(&mut self, count: u8) -> Option<u32>;

    /// Consume `count` bits that were previously peeked.
    fn drop_bits(&mut self, count: u8);

    /// Number of bits available without new input.
    fn available_bits(&self) -> usize;

    /// Number of whole bytes available for [`BitCursor::copy_bytes`].
    ///
    /// Only meaningful once the cursor is byte-aligned.
    fn available_bytes(&self) -> usize;

    /// Copy byte-aligned bytes into `dest`, returning how many were copied.
    fn copy_bytes(&mut self, dest: &mut [u8]) -> usize;

    /// Discard bits up to the next byte boundary.
    fn align_to_byte(&mut self);

    /// Number of bits consumed so far (for error reporting).
    fn bit_position(&self) -> u64;

    /// Read `count` bits, or `None` without consuming anything.
    fn read_bits(&mut self, count: u8) -> Option<u32> {
        let value = self.peek_bits(count)?;
        self.drop_bits(count);
        Some(value)
    }
}

/// A [`BitCursor`] over an owned, incrementally fed input queue.
///
/// Bits are staged into a 64-bit buffer one byte at a time and only as far as
/// a request needs, so at most a few bytes sit in the staging buffer at any
/// moment. Bytes still in the queue can be handed back with
/// [`StreamCursor::take_unstaged`].
#[derive(Debug, Clone, Default)]
pub struct StreamCursor {
    /// Pending input bytes.
    input: Vec<u8>,
    /// Next unstaged byte in `input`.
    input_pos: usize,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Total bits consumed.
    total_bits_consumed: u64,
}

impl StreamCursor {
    /// Create a cursor over `data`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            input: data.into(),
            ..Self::default()
        }
    }

    /// Append more input, discarding bytes that were already staged.
    pub fn push_input(&mut self, data: &[u8]) {
        if self.input_pos > 0 {
            self.input.drain(..self.input_pos);
            self.input_pos = 0;
        }
        self.input.extend_from_slice(data);
    }

    /// Drop all input bytes that have not been staged yet and return how many
    /// there were. Staged bits are kept.
    pub fn take_unstaged(&mut self) -> usize {
        let unstaged = self.input.len() - self.input_pos;
        self.input.clear();
        self.input_pos = 0;
        unstaged
    }

    /// Number of input bytes not yet staged into the bit buffer.
    pub fn unstaged_len(&self) -> usize {
        self.input.len() - self.input_pos
    }

    /// Stage bytes until at least `count` bits are buffered or input runs out.
    #[inline]
    fn refill(&mut self, count: u8) {
        while self.bits_in_buffer < count && self.input_pos < self.input.len() {
            self.buffer |= (self.input[self.input_pos] as u64) << self.bits_in_buffer;
            self.bits_in_buffer += 8;
            self.input_pos += 1;
        }
    }
}

impl BitCursor for StreamCursor {
    #[inline]
    fn peek_bits(&mut self, count: u8) -> Option<u32> {
        debug_assert!(count <= MAX_PEEK_BITS, "Cannot peek more than 16 bits");

        if count == 0 {
            return Some(0);
        }

        self.refill(count);

        if self.bits_in_buffer < count {
            return None;
        }

        let mask = (1u64 << count).wrapping_sub(1);
        Some((self.buffer & mask) as u32)
    }

    #[inline]
    fn drop_bits(&mut self, count: u8) {
        self.refill(count);
        debug_assert!(count <= self.bits_in_buffer, "Dropping unavailable bits");
        let count = count.min(self.bits_in_buffer);

        self.buffer >>= count;
        self.bits_in_buffer -= count;
        self.total_bits_consumed += count as u64;
    }

    fn available_bits(&self) -> usize {
        self.bits_in_buffer as usize + (self.input.len() - self.input_pos) * 8
    }

    fn available_bytes(&self) -> usize {
        (self.bits_in_buffer / 8) as usize + (self.input.len() - self.input_pos)
    }

    fn copy_bytes(&mut self, dest: &mut [u8]) -> usize {
        debug_assert!(
            self.bits_in_buffer % 8 == 0,
            "copy_bytes requires a byte-aligned cursor"
        );

        // Staged whole bytes come first
        let mut copied = 0;
        while self.bits_in_buffer >= 8 && copied < dest.len() {
            dest[copied] = (self.buffer & 0xFF) as u8;
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
            copied += 1;
        }

        let direct = (dest.len() - copied).min(self.input.len() - self.input_pos);
        dest[copied..copied + direct]
            .copy_from_slice(&self.input[self.input_pos..self.input_pos + direct]);
        self.input_pos += direct;
        copied += direct;

        self.total_bits_consumed += copied as u64 * 8;
        copied
    }

    fn align_to_byte(&mut self) {
        let remainder = self.bits_in_buffer % 8;
        if remainder > 0 {
            self.buffer >>= remainder;
            self.bits_in_buffer -= remainder;
            self.total_bits_consumed += remainder as u64;
        }
    }

    fn bit_position(&self) -> u64 {
        self.total_bits_consumed
    }
}
