//! Streaming DEFLATE decompression over caller-supplied buffers.
//!
//! [`StreamDecoder`] adapts the [`Inflater`] state machine to the
//! [`Decompressor`] trait: each call accepts any amount of input and any
//! output buffer size, and reports how much of each it used.

use crate::config::InflateConfig;
use crate::inflate::{InflateStats, InflateStatus, Inflater};
use tiflate_core::cursor::{BitCursor, StreamCursor};
use tiflate_core::error::Result;
use tiflate_core::traits::{DecompressStatus, Decompressor};

/// Streaming DEFLATE decoder.
///
/// A call that stops for more input takes every byte it was given: bits of a
/// partially decoded element are buffered internally, so a call may consume
/// input without producing output. A call that stops because `output` is full
/// or the stream has ended reports only the bytes it decoded, so input past
/// the end of the stream is never counted as consumed.
#[derive(Debug)]
pub struct StreamDecoder {
    inflater: Inflater,
    cursor: StreamCursor,
}

impl StreamDecoder {
    /// Create a new streaming decoder with the default configuration.
    pub fn new() -> Self {
        Self::with_config(InflateConfig::default())
    }

    /// Create a new streaming decoder with the given configuration.
    pub fn with_config(config: InflateConfig) -> Self {
        Self {
            inflater: Inflater::with_config(config),
            cursor: StreamCursor::default(),
        }
    }

    /// Create a new streaming decoder with a preset dictionary.
    pub fn with_dictionary(dictionary: &[u8]) -> Result<Self> {
        Ok(Self {
            inflater: Inflater::with_dictionary(dictionary)?,
            cursor: StreamCursor::default(),
        })
    }

    /// Get the counters for the stream decoded so far.
    pub fn stats(&self) -> InflateStats {
        self.inflater.stats()
    }

    /// Total bits consumed from the compressed stream.
    pub fn bits_consumed(&self) -> u64 {
        self.cursor.bit_position()
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for StreamDecoder {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        self.cursor.push_input(input);
        let mut produced = 0;

        let status = loop {
            produced += self.inflater.copy_output(&mut output[produced..])?;
            if self.inflater.pending_output() > 0 {
                break DecompressStatus::NeedsOutput;
            }

            match self.inflater.inflate_step(&mut self.cursor)? {
                InflateStatus::NeedsOutput => continue,
                InflateStatus::NeedsInput => {
                    produced += self.inflater.copy_output(&mut output[produced..])?;
                    break if self.inflater.pending_output() > 0 {
                        DecompressStatus::NeedsOutput
                    } else {
                        DecompressStatus::NeedsInput
                    };
                }
                InflateStatus::Done => {
                    produced += self.inflater.copy_output(&mut output[produced..])?;
                    break if self.inflater.pending_output() > 0 {
                        DecompressStatus::NeedsOutput
                    } else {
                        DecompressStatus::Done
                    };
                }
            }
        };

        // Only a stalled decoder keeps its unstaged bytes. On every other
        // return the caller supplies the rest again, and bytes past the end
        // of the stream stay with the caller.
        let consumed = if status == DecompressStatus::NeedsInput {
            input.len()
        } else {
            input.len().saturating_sub(self.cursor.take_unstaged())
        };
        Ok((consumed, produced, status))
    }

    fn reset(&mut self) {
        self.inflater.reset();
        self.cursor = StreamCursor::default();
    }

    fn is_finished(&self) -> bool {
        self.inflater.is_finished() && self.inflater.pending_output() == 0
    }
}
