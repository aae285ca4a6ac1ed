//! Canonical Huffman decoding tables for DEFLATE.
//!
//! DEFLATE uses canonical Huffman codes (RFC 1951 Section 3.2.2): codes of the
//! same length are consecutive integers in symbol order, so a code set is
//! fully described by one bit length per symbol.
//!
//! # Table layout
//!
//! Codes are read LSB-first, so every code is bit-reversed before it is
//! placed in the table. The table has two levels:
//!
//! ```text
//!   primary (512 slots, indexed by the next 9 bits)
//!   ┌───────────────────────┐
//!   │ Symbol { sym, len<=9 }│  replicated over all unused high bits
//!   │ SubTable { off, bits }├──┐
//!   │ Invalid               │  │  sub-table (2^bits slots, indexed by
//!   └───────────────────────┘  └─> the bits after the 9-bit prefix)
//! ```
//!
//! Codes of 10-15 bits get one sub-table per distinct 9-bit prefix, sized for
//! the longest code under that prefix. Any code resolves in at most two
//! lookups.
//!
//! # Alphabets
//!
//! - **Literal/Length**: 0-287 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-31 (30 and 31 never occur in valid data)
//! - **Code Length**: 0-18 (for encoding dynamic Huffman trees)

use crate::config::TreePolicy;
use tiflate_core::cursor::BitCursor;
use tiflate_core::error::{Result, TiflateError};

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: usize = 15;

/// Number of bits resolved by the primary table.
pub const PRIMARY_BITS: u8 = 9;

const PRIMARY_SIZE: usize = 1 << PRIMARY_BITS;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// One slot of a [`HuffmanTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableEntry {
    /// No code maps to this slot.
    Invalid,
    /// A fully resolved symbol and its total code length.
    Symbol { symbol: u16, length: u8 },
    /// Pointer to a sub-table indexed by `bits` further bits.
    SubTable { offset: u16, bits: u8 },
}

/// Outcome of decoding one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A symbol was decoded and its bits consumed.
    Symbol(u16),
    /// The cursor does not hold enough bits yet; nothing was consumed.
    NeedMoreInput,
}

/// A two-level canonical Huffman decoding table.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    /// Primary table followed by all sub-tables.
    entries: Vec<TableEntry>,
    /// Longest code length in use (0 for an empty code).
    max_code_length: u8,
}

impl HuffmanTable {
    /// Build a decoding table from per-symbol code lengths.
    ///
    /// # Arguments
    ///
    /// * `code_lengths` - `code_lengths[i]` is the bit length of symbol `i`;
    ///   0 means the symbol is unused.
    /// * `policy` - How incomplete code sets are treated.
    pub fn new(code_lengths: &[u8], policy: TreePolicy) -> Result<Self> {
        if code_lengths.len() > u16::MAX as usize {
            return Err(TiflateError::invalid_tree("alphabet too large"));
        }

        // Count codes of each length
        let mut bl_count = [0u16; MAX_CODE_LENGTH + 1];
        for &len in code_lengths {
            if len as usize > MAX_CODE_LENGTH {
                return Err(TiflateError::invalid_tree(format!(
                    "code length {} exceeds maximum {}",
                    len, MAX_CODE_LENGTH
                )));
            }
            bl_count[len as usize] += 1;
        }
        bl_count[0] = 0;

        let used: u16 = bl_count.iter().sum();
        let max_code_length = (1..=MAX_CODE_LENGTH)
            .rev()
            .find(|&len| bl_count[len] > 0)
            .unwrap_or(0) as u8;

        // Kraft check: `left` is the unassigned code space at each length
        let mut left: i32 = 1;
        for &count in &bl_count[1..] {
            left = (left << 1) - count as i32;
            if left < 0 {
                return Err(TiflateError::invalid_tree("over-subscribed code lengths"));
            }
        }
        if left > 0 && used > 1 && policy == TreePolicy::Strict {
            return Err(TiflateError::invalid_tree("incomplete code lengths"));
        }

        // First code of each length (RFC 1951 Section 3.2.2)
        let mut next_code = [0u32; MAX_CODE_LENGTH + 1];
        let mut code = 0u32;
        for bits in 1..=MAX_CODE_LENGTH {
            code = (code + bl_count[bits - 1] as u32) << 1;
            next_code[bits] = code;
        }

        // Assign codes, stored bit-reversed for LSB-first lookup
        let mut codes = Vec::with_capacity(used as usize);
        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len > 0 {
                let reversed = Self::reverse_bits(next_code[len as usize], len);
                next_code[len as usize] += 1;
                codes.push((symbol as u16, len, reversed));
            }
        }

        // Pre-pass: sub-table width for each 9-bit prefix of a long code
        let mut sub_bits = [0u8; PRIMARY_SIZE];
        for &(_, len, reversed) in &codes {
            if len > PRIMARY_BITS {
                let prefix = (reversed as usize) & (PRIMARY_SIZE - 1);
                sub_bits[prefix] = sub_bits[prefix].max(len - PRIMARY_BITS);
            }
        }
        let total = PRIMARY_SIZE
            + sub_bits
                .iter()
                .filter(|&&bits| bits > 0)
                .map(|&bits| 1usize << bits)
                .sum::<usize>();

        let mut entries = vec![TableEntry::Invalid; total];
        let mut offset = PRIMARY_SIZE;
        for (prefix, &bits) in sub_bits.iter().enumerate() {
            if bits > 0 {
                entries[prefix] = TableEntry::SubTable {
                    offset: offset as u16,
                    bits,
                };
                offset += 1 << bits;
            }
        }

        // Fill every slot whose low bits match a code
        for &(symbol, length, reversed) in &codes {
            let entry = TableEntry::Symbol { symbol, length };
            let reversed = reversed as usize;

            if length <= PRIMARY_BITS {
                for index in (reversed..PRIMARY_SIZE).step_by(1 << length) {
                    entries[index] = entry;
                }
            } else if let TableEntry::SubTable { offset, bits } =
                entries[reversed & (PRIMARY_SIZE - 1)]
            {
                let base = offset as usize;
                let low = reversed >> PRIMARY_BITS;
                for index in (low..(1 << bits)).step_by(1 << (length - PRIMARY_BITS)) {
                    entries[base + index] = entry;
                }
            }
        }

        Ok(Self {
            entries,
            max_code_length,
        })
    }

    /// Reverse the low `length` bits of a code.
    fn reverse_bits(mut code: u32, length: u8) -> u32 {
        let mut reversed = 0u32;
        for _ in 0..length {
            reversed = (reversed << 1) | (code & 1);
            code >>= 1;
        }
        reversed
    }

    /// Longest code length in this table (0 if no symbol is used).
    pub fn max_code_length(&self) -> u8 {
        self.max_code_length
    }

    /// Total number of table slots, primary plus sub-tables.
    pub fn table_size(&self) -> usize {
        self.entries.len()
    }

    /// Decode one symbol.
    ///
    /// Works with whatever bits the cursor holds. If they are not enough to
    /// resolve a symbol, returns [`Decoded::NeedMoreInput`] and consumes
    /// nothing, so the call can simply be repeated after more input arrives.
    #[inline]
    pub fn decode<C: BitCursor + ?Sized>(&self, cursor: &mut C) -> Result<Decoded> {
        let available = cursor.available_bits().min(PRIMARY_BITS as usize) as u8;
        let Some(bits) = cursor.peek_bits(available) else {
            return Ok(Decoded::NeedMoreInput);
        };

        match self.entries[bits as usize] {
            TableEntry::Symbol { symbol, length } => {
                if length > available {
                    return Ok(Decoded::NeedMoreInput);
                }
                cursor.drop_bits(length);
                Ok(Decoded::Symbol(symbol))
            }
            TableEntry::SubTable { offset, bits } => {
                if available < PRIMARY_BITS {
                    return Ok(Decoded::NeedMoreInput);
                }
                self.decode_subtable(cursor, offset as usize, PRIMARY_BITS + bits)
            }
            TableEntry::Invalid => {
                if available < self.max_code_length.min(PRIMARY_BITS) {
                    Ok(Decoded::NeedMoreInput)
                } else {
                    Err(TiflateError::invalid_huffman(cursor.bit_position()))
                }
            }
        }
    }

    /// Second lookup for codes longer than the primary table.
    fn decode_subtable<C: BitCursor + ?Sized>(
        &self,
        cursor: &mut C,
        offset: usize,
        wanted: u8,
    ) -> Result<Decoded> {
        let available = cursor.available_bits().min(wanted as usize) as u8;
        let Some(bits) = cursor.peek_bits(available) else {
            return Ok(Decoded::NeedMoreInput);
        };

        match self.entries[offset + (bits >> PRIMARY_BITS) as usize] {
            TableEntry::Symbol { symbol, length } if length <= available => {
                cursor.drop_bits(length);
                Ok(Decoded::Symbol(symbol))
            }
            TableEntry::Symbol { .. } => Ok(Decoded::NeedMoreInput),
            TableEntry::Invalid if available < wanted => Ok(Decoded::NeedMoreInput),
            TableEntry::Invalid | TableEntry::SubTable { .. } => {
                Err(TiflateError::invalid_huffman(cursor.bit_position()))
            }
        }
    }
}
