//! # tiflate deflate
//!
//! Resumable DEFLATE (RFC 1951) decompression for TIFF Deflate strips and
//! tiles (compression tags 8 and 32946).
//!
//! ## Features
//!
//! - All three block types
//!   - Stored (uncompressed) blocks
//!   - Fixed Huffman codes
//!   - Dynamic Huffman codes
//! - Two-level Huffman lookup tables (9-bit primary, per-prefix sub-tables)
//! - Input and output in arbitrarily small pieces: decoding pauses when
//!   either runs out and resumes exactly where it stopped
//! - Preset dictionaries
//! - Optional output limit and strict Huffman tree validation
//!
//! ## Example
//!
//! ```rust
//! use tiflate_deflate::inflate;
//!
//! // A stored block holding "Hi"
//! let data = [0x01, 0x02, 0x00, 0xFD, 0xFF, b'H', b'i'];
//! assert_eq!(inflate(&data).unwrap(), b"Hi");
//! ```
//!
//! ## Streaming
//!
//! ```rust
//! use tiflate_deflate::StreamDecoder;
//! use tiflate_core::traits::{DecompressStatus, Decompressor};
//!
//! let data = [0x01, 0x02, 0x00, 0xFD, 0xFF, b'H', b'i'];
//! let mut decoder = StreamDecoder::new();
//! let mut out = [0u8; 16];
//!
//! let (consumed, produced, status) = decoder.decompress(&data, &mut out).unwrap();
//! assert_eq!(consumed, data.len());
//! assert_eq!(&out[..produced], b"Hi");
//! assert_eq!(status, DecompressStatus::Done);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod huffman;
pub mod inflate;
pub mod stream;
pub mod tables;

#[cfg(test)]
mod test_util;

// Re-exports
pub use config::{InflateConfig, TreePolicy};
pub use huffman::{Decoded, HuffmanTable};
pub use inflate::{
    InflateStats, InflateStatus, Inflater, inflate, inflate_with_config, inflate_with_dictionary,
};
pub use stream::StreamDecoder;
