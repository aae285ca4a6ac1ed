//! # tiflate core
//!
//! Core components shared by the tiflate decoders.
//!
//! - [`cursor`]: The bit cursor contract and a feedable implementation
//! - [`window`]: The 32 KB sliding window for LZ77 reconstruction
//! - [`traits`]: The streaming [`Decompressor`] trait
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Caller: TIFF strip / tile reader                        │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec: tiflate-deflate                                  │
//! │     Huffman tables, inflate state machine               │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate)                                       │
//! │     BitCursor, SlidingWindow, errors                    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tiflate_core::cursor::{BitCursor, StreamCursor};
//! use tiflate_core::window::SlidingWindow;
//!
//! let mut cursor = StreamCursor::new(vec![0x0F]);
//! assert_eq!(cursor.read_bits(4), Some(0xF));
//!
//! let mut window = SlidingWindow::new();
//! window.write(b'z').unwrap();
//! window.repeat(3, 1).unwrap();
//!
//! let mut out = [0u8; 4];
//! assert_eq!(window.copy_output(&mut out).unwrap(), 4);
//! assert_eq!(&out, b"zzzz");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
pub mod error;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use cursor::{BitCursor, StreamCursor};
pub use error::{Result, TiflateError};
pub use traits::{DecompressStatus, Decompressor};
pub use window::{SlidingWindow, WINDOW_SIZE};
