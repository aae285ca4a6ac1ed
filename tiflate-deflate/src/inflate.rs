//! DEFLATE decompression (inflate).
//!
//! This module implements the DEFLATE decompression algorithm as specified
//! in RFC 1951. It supports all three block types:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! The [`Inflater`] is a resumable state machine. Every call to
//! [`Inflater::inflate_step`] decodes as far as the cursor's input and the
//! window's free space allow, then reports why it stopped. No input is
//! consumed for an element that cannot be completed, so the caller can feed
//! more bytes and call again.

use crate::config::InflateConfig;
use crate::huffman::{Decoded, END_OF_BLOCK, HuffmanTable};
use crate::tables::{
    CODE_LENGTH_ORDER, CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, LITLEN_ALPHABET_SIZE,
    MAX_LITLEN_CODES, MAX_MATCH, distance_code, fixed_distance_table, fixed_litlen_table,
    length_code,
};
use std::io::Write;
use tiflate_core::cursor::{BitCursor, StreamCursor};
use tiflate_core::error::{Result, TiflateError};
use tiflate_core::window::SlidingWindow;

/// Maximum dictionary size for DEFLATE (32KB).
pub const MAX_DICTIONARY_SIZE: usize = tiflate_core::window::WINDOW_SIZE;

/// Drain chunk used by [`Inflater::decompress_to`].
const SINK_CHUNK: usize = 8192;

/// Why [`Inflater::inflate_step`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateStatus {
    /// The cursor ran out of bits in the middle of an element.
    NeedsInput,
    /// The window is too full to guarantee room for the next element.
    /// Drain it with [`Inflater::copy_output`] and step again.
    NeedsOutput,
    /// The final block has ended.
    Done,
}

/// Counters describing the stream decoded so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InflateStats {
    /// Block headers read.
    pub blocks: u64,
    /// Literal bytes emitted by Huffman blocks.
    pub literals: u64,
    /// Back-references copied.
    pub matches: u64,
    /// Total bytes produced, stored blocks included.
    pub bytes_out: u64,
}

/// Decoder state between elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    /// Expecting the 3-bit block header.
    Header,
    /// Expecting LEN/NLEN after byte alignment.
    StoredHeader,
    /// Copying raw bytes.
    Stored { remaining: usize },
    /// Expecting HLIT, HDIST and HCLEN.
    DynamicCounts,
    /// Reading the 3-bit code length code lengths.
    CodeLengthCodes,
    /// Decoding code length symbols.
    CodeLengths,
    /// Waiting for the extra bits of repeat symbol 16, 17 or 18.
    CodeLengthRepeat { symbol: u16 },
    /// Decoding literal/length symbols.
    Literal,
    /// Waiting for the extra bits of a length symbol.
    LengthExtra { base: u16, extra: u8 },
    /// Decoding the distance symbol of a match.
    Distance { length: u16 },
    /// Waiting for the extra bits of a distance symbol.
    DistanceExtra { length: u16, base: u16, extra: u8 },
    /// The final block has ended.
    Done,
    /// An error aborted the stream.
    Failed,
}

/// Huffman tables for the current block.
#[derive(Debug)]
enum BlockTables {
    Fixed,
    Dynamic {
        litlen: HuffmanTable,
        distance: HuffmanTable,
    },
}

impl BlockTables {
    fn litlen(&self) -> &HuffmanTable {
        match self {
            Self::Fixed => fixed_litlen_table(),
            Self::Dynamic { litlen, .. } => litlen,
        }
    }

    fn distance(&self) -> &HuffmanTable {
        match self {
            Self::Fixed => fixed_distance_table(),
            Self::Dynamic { distance, .. } => distance,
        }
    }
}

/// Partially read dynamic block header.
#[derive(Debug)]
struct DynamicHeader {
    hlit: usize,
    hdist: usize,
    hclen: usize,
    /// Code length code lengths, indexed by code length symbol.
    code_length_lengths: [u8; CODELEN_ALPHABET_SIZE],
    /// Code length code lengths read so far.
    read: usize,
    /// Literal/length lengths followed by distance lengths.
    lengths: [u8; LITLEN_ALPHABET_SIZE + DISTANCE_ALPHABET_SIZE],
    /// Entries of `lengths` filled so far.
    filled: usize,
    code_length_table: Option<HuffmanTable>,
}

impl DynamicHeader {
    fn new() -> Self {
        Self {
            hlit: 0,
            hdist: 0,
            hclen: 0,
            code_length_lengths: [0; CODELEN_ALPHABET_SIZE],
            read: 0,
            lengths: [0; LITLEN_ALPHABET_SIZE + DISTANCE_ALPHABET_SIZE],
            filled: 0,
            code_length_table: None,
        }
    }

    fn total(&self) -> usize {
        self.hlit + self.hdist
    }
}

/// DEFLATE decompressor.
#[derive(Debug)]
pub struct Inflater {
    /// History and undrained output.
    window: SlidingWindow,
    config: InflateConfig,
    state: BlockState,
    /// Whether the current block is marked final.
    final_block: bool,
    tables: BlockTables,
    header: Box<DynamicHeader>,
    stats: InflateStats,
}

impl Inflater {
    /// Create a new DEFLATE decompressor with the default configuration.
    pub fn new() -> Self {
        Self::with_config(InflateConfig::default())
    }

    /// Create a new DEFLATE decompressor with the given configuration.
    pub fn with_config(config: InflateConfig) -> Self {
        Self {
            window: SlidingWindow::new(),
            config,
            state: BlockState::Header,
            final_block: false,
            tables: BlockTables::Fixed,
            header: Box::new(DynamicHeader::new()),
            stats: InflateStats::default(),
        }
    }

    /// Create a new DEFLATE decompressor with a preset dictionary.
    pub fn with_dictionary(dictionary: &[u8]) -> Result<Self> {
        let mut inflater = Self::new();
        inflater.set_dictionary(dictionary)?;
        Ok(inflater)
    }

    /// Set a preset dictionary for decompression.
    ///
    /// The dictionary must match the one used during compression. Only the
    /// last [`MAX_DICTIONARY_SIZE`] bytes of a longer dictionary are used.
    /// Fails with `InvalidState` once decoding has begun.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        if self.state != BlockState::Header || self.stats.blocks > 0 {
            return Err(TiflateError::invalid_state(
                "dictionary must be set before the first block",
            ));
        }
        self.window.copy_dict(dictionary)
    }

    /// Get the configuration.
    pub fn config(&self) -> &InflateConfig {
        &self.config
    }

    /// Get the counters for the stream decoded so far.
    pub fn stats(&self) -> InflateStats {
        self.stats
    }

    /// Check whether the final block has been decoded.
    ///
    /// Output may still be pending in the window.
    pub fn is_finished(&self) -> bool {
        self.state == BlockState::Done
    }

    /// Number of decoded bytes waiting to be drained.
    pub fn pending_output(&self) -> usize {
        self.window.pending()
    }

    /// Drain decoded bytes into `dest`.
    pub fn copy_output(&mut self, dest: &mut [u8]) -> Result<usize> {
        self.window.copy_output(dest)
    }

    /// Reset for a new stream, keeping the configuration.
    pub fn reset(&mut self) {
        self.window.reset();
        self.state = BlockState::Header;
        self.final_block = false;
        self.tables = BlockTables::Fixed;
        *self.header = DynamicHeader::new();
        self.stats = InflateStats::default();
    }

    /// Decode as far as input and window space allow.
    ///
    /// Any error leaves the decoder failed; later calls return an
    /// `InvalidState` error until [`Inflater::reset`].
    pub fn inflate_step<C: BitCursor + ?Sized>(&mut self, cursor: &mut C) -> Result<InflateStatus> {
        let result = self.run(cursor);
        if result.is_err() {
            self.state = BlockState::Failed;
        }
        result
    }

    /// Decode everything the cursor holds, writing output to `sink`.
    ///
    /// Returns [`InflateStatus::NeedsInput`] if the cursor runs dry before the
    /// final block ends, or [`InflateStatus::Done`].
    pub fn decompress_to<C, W>(&mut self, cursor: &mut C, sink: &mut W) -> Result<InflateStatus>
    where
        C: BitCursor + ?Sized,
        W: Write + ?Sized,
    {
        let mut chunk = vec![0u8; SINK_CHUNK];

        loop {
            let status = self.inflate_step(cursor)?;

            loop {
                let n = self.window.copy_output(&mut chunk)?;
                if n == 0 {
                    break;
                }
                sink.write_all(&chunk[..n])?;
            }

            if status != InflateStatus::NeedsOutput {
                return Ok(status);
            }
        }
    }

    fn run<C: BitCursor + ?Sized>(&mut self, cursor: &mut C) -> Result<InflateStatus> {
        loop {
            match self.state {
                BlockState::Done => return Ok(InflateStatus::Done),
                BlockState::Failed => {
                    return Err(TiflateError::invalid_state(
                        "stream aborted by an earlier error; reset before reuse",
                    ));
                }

                BlockState::Header => {
                    let Some(header) = cursor.read_bits(3) else {
                        return Ok(InflateStatus::NeedsInput);
                    };
                    self.final_block = header & 1 != 0;
                    self.stats.blocks += 1;

                    self.state = match header >> 1 {
                        0 => BlockState::StoredHeader,
                        1 => {
                            self.tables = BlockTables::Fixed;
                            BlockState::Literal
                        }
                        2 => BlockState::DynamicCounts,
                        _ => {
                            return Err(TiflateError::corrupted(
                                cursor.bit_position() / 8,
                                "reserved block type 3",
                            ));
                        }
                    };
                }

                BlockState::StoredHeader => {
                    cursor.align_to_byte();
                    if cursor.available_bits() < 32 {
                        return Ok(InflateStatus::NeedsInput);
                    }
                    let (Some(len), Some(nlen)) = (cursor.read_bits(16), cursor.read_bits(16))
                    else {
                        return Err(TiflateError::unexpected_eof(4));
                    };

                    if len != !nlen & 0xFFFF {
                        return Err(TiflateError::corrupted(
                            cursor.bit_position() / 8,
                            format!("LEN/NLEN mismatch: {} vs {}", len, !nlen & 0xFFFF),
                        ));
                    }
                    self.state = BlockState::Stored {
                        remaining: len as usize,
                    };
                }

                BlockState::Stored { remaining } => {
                    if remaining == 0 {
                        self.end_block();
                        continue;
                    }
                    if self.window.free() == 0 {
                        return Ok(InflateStatus::NeedsOutput);
                    }

                    let copied = self.window.copy_stored(cursor, remaining);
                    if copied == 0 {
                        return Ok(InflateStatus::NeedsInput);
                    }
                    self.state = BlockState::Stored {
                        remaining: remaining - copied,
                    };
                    self.record_output(copied)?;
                }

                BlockState::DynamicCounts => {
                    let Some(counts) = cursor.read_bits(14) else {
                        return Ok(InflateStatus::NeedsInput);
                    };
                    let hlit = (counts & 0x1F) as usize + 257;
                    if hlit > MAX_LITLEN_CODES {
                        return Err(TiflateError::corrupted(
                            cursor.bit_position() / 8,
                            format!("too many literal/length codes: {}", hlit),
                        ));
                    }

                    *self.header = DynamicHeader::new();
                    self.header.hlit = hlit;
                    self.header.hdist = ((counts >> 5) & 0x1F) as usize + 1;
                    self.header.hclen = ((counts >> 10) & 0xF) as usize + 4;
                    self.state = BlockState::CodeLengthCodes;
                }

                BlockState::CodeLengthCodes => {
                    while self.header.read < self.header.hclen {
                        let Some(len) = cursor.read_bits(3) else {
                            return Ok(InflateStatus::NeedsInput);
                        };
                        let symbol = CODE_LENGTH_ORDER[self.header.read];
                        self.header.code_length_lengths[symbol] = len as u8;
                        self.header.read += 1;
                    }

                    self.header.code_length_table = Some(HuffmanTable::new(
                        &self.header.code_length_lengths,
                        self.config.tree_policy,
                    )?);
                    self.state = BlockState::CodeLengths;
                }

                BlockState::CodeLengths => {
                    if self.header.filled == self.header.total() {
                        self.build_dynamic_tables(cursor.bit_position())?;
                        self.state = BlockState::Literal;
                        continue;
                    }

                    let table = self.header.code_length_table.as_ref().ok_or_else(|| {
                        TiflateError::invalid_state("code length table missing")
                    })?;

                    match table.decode(cursor)? {
                        Decoded::NeedMoreInput => return Ok(InflateStatus::NeedsInput),
                        Decoded::Symbol(len @ 0..=15) => {
                            let filled = self.header.filled;
                            self.header.lengths[filled] = len as u8;
                            self.header.filled += 1;
                        }
                        Decoded::Symbol(symbol) => {
                            if symbol == 16 && self.header.filled == 0 {
                                return Err(TiflateError::corrupted(
                                    cursor.bit_position() / 8,
                                    "repeat code 16 with no previous length",
                                ));
                            }
                            self.state = BlockState::CodeLengthRepeat { symbol };
                        }
                    }
                }

                BlockState::CodeLengthRepeat { symbol } => {
                    let (extra_bits, base) = match symbol {
                        16 => (2, 3),
                        17 => (3, 3),
                        _ => (7, 11),
                    };
                    let Some(extra) = cursor.read_bits(extra_bits) else {
                        return Ok(InflateStatus::NeedsInput);
                    };

                    let count = base + extra as usize;
                    let filled = self.header.filled;
                    if filled + count > self.header.total() {
                        return Err(TiflateError::corrupted(
                            cursor.bit_position() / 8,
                            format!(
                                "code lengths overflow: {} + {} > {}",
                                filled,
                                count,
                                self.header.total()
                            ),
                        ));
                    }

                    let value = if symbol == 16 {
                        self.header.lengths[filled - 1]
                    } else {
                        0
                    };
                    self.header.lengths[filled..filled + count].fill(value);
                    self.header.filled += count;
                    self.state = BlockState::CodeLengths;
                }

                BlockState::Literal => {
                    if self.window.free() < MAX_MATCH {
                        return Ok(InflateStatus::NeedsOutput);
                    }

                    match self.tables.litlen().decode(cursor)? {
                        Decoded::NeedMoreInput => return Ok(InflateStatus::NeedsInput),
                        Decoded::Symbol(symbol) if symbol < END_OF_BLOCK => {
                            self.window.write(symbol as u8)?;
                            self.stats.literals += 1;
                            self.record_output(1)?;
                        }
                        Decoded::Symbol(END_OF_BLOCK) => self.end_block(),
                        Decoded::Symbol(symbol) => {
                            let (base, extra) = length_code(symbol).ok_or_else(|| {
                                TiflateError::corrupted(
                                    cursor.bit_position() / 8,
                                    format!("invalid literal/length symbol: {}", symbol),
                                )
                            })?;
                            self.state = BlockState::LengthExtra { base, extra };
                        }
                    }
                }

                BlockState::LengthExtra { base, extra } => {
                    let Some(value) = cursor.read_bits(extra) else {
                        return Ok(InflateStatus::NeedsInput);
                    };
                    self.state = BlockState::Distance {
                        length: base + value as u16,
                    };
                }

                BlockState::Distance { length } => match self.tables.distance().decode(cursor)? {
                    Decoded::NeedMoreInput => return Ok(InflateStatus::NeedsInput),
                    Decoded::Symbol(symbol) => {
                        let (base, extra) = distance_code(symbol).ok_or_else(|| {
                            TiflateError::corrupted(
                                cursor.bit_position() / 8,
                                format!("invalid distance symbol: {}", symbol),
                            )
                        })?;
                        self.state = BlockState::DistanceExtra {
                            length,
                            base,
                            extra,
                        };
                    }
                },

                BlockState::DistanceExtra {
                    length,
                    base,
                    extra,
                } => {
                    let Some(value) = cursor.read_bits(extra) else {
                        return Ok(InflateStatus::NeedsInput);
                    };
                    let distance = base as usize + value as usize;

                    self.window.repeat(length as usize, distance)?;
                    self.stats.matches += 1;
                    self.state = BlockState::Literal;
                    self.record_output(length as usize)?;
                }
            }
        }
    }

    fn end_block(&mut self) {
        self.state = if self.final_block {
            BlockState::Done
        } else {
            BlockState::Header
        };
    }

    fn record_output(&mut self, count: usize) -> Result<()> {
        self.stats.bytes_out += count as u64;
        match self.config.output_limit {
            Some(limit) if self.stats.bytes_out > limit => Err(TiflateError::output_limit(limit)),
            _ => Ok(()),
        }
    }

    fn build_dynamic_tables(&mut self, bit_position: u64) -> Result<()> {
        let header = &mut *self.header;
        let (litlen_lengths, distance_lengths) =
            header.lengths[..header.total()].split_at(header.hlit);

        if litlen_lengths[END_OF_BLOCK as usize] == 0 {
            return Err(TiflateError::corrupted(
                bit_position / 8,
                "missing end-of-block code",
            ));
        }

        let policy = self.config.tree_policy;
        self.tables = BlockTables::Dynamic {
            litlen: HuffmanTable::new(litlen_lengths, policy)?,
            distance: HuffmanTable::new(distance_lengths, policy)?,
        };
        header.code_length_table = None;
        Ok(())
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

/// Decompress a complete DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    inflate_with_config(data, InflateConfig::default())
}

/// Decompress a complete DEFLATE stream with a custom configuration.
pub fn inflate_with_config(data: &[u8], config: InflateConfig) -> Result<Vec<u8>> {
    inflate_all(Inflater::with_config(config), data)
}

/// Decompress a complete DEFLATE stream encoded against a preset dictionary.
pub fn inflate_with_dictionary(data: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
    inflate_all(Inflater::with_dictionary(dictionary)?, data)
}

fn inflate_all(mut inflater: Inflater, data: &[u8]) -> Result<Vec<u8>> {
    let mut cursor = StreamCursor::new(data);
    let mut output = Vec::with_capacity(data.len().saturating_mul(4));

    match inflater.decompress_to(&mut cursor, &mut output)? {
        InflateStatus::Done => Ok(output),
        _ => Err(TiflateError::unexpected_eof(1)),
    }
}
