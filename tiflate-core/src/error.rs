//! Error types for tiflate operations.
//!
//! Errors fall into three families:
//!
//! - **Data format** errors describe a malformed compressed stream (bad block
//!   type, LEN/NLEN mismatch, broken Huffman tables, back-references past the
//!   available history). The stream is aborted.
//! - **Capacity violations** mean the sliding window was driven past its
//!   bounds. Input data cannot cause these; they point at a bug in the code
//!   orchestrating the window.
//! - **Invalid state** errors reject an operation whose preconditions do not
//!   hold, such as preloading a dictionary into a window that already has
//!   history.
//!
//! Running out of input is not an error. Decoders report it through their
//! status values instead.

use std::io;
use thiserror::Error;

/// The main error type for tiflate operations.
#[derive(Debug, Error)]
pub enum TiflateError {
    /// I/O error from an output sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid Huffman code encountered during decompression.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Corrupted compressed data.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Code lengths that do not describe a usable canonical Huffman code.
    #[error("Invalid Huffman tree: {message}")]
    InvalidTree {
        /// Description of the problem.
        message: String,
    },

    /// Invalid distance in an LZ77 back-reference.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Current history size.
        history_size: usize,
    },

    /// A window operation would exceed the window's capacity.
    #[error("Capacity violation in {operation}: requested {requested} bytes, {available} available")]
    CapacityViolation {
        /// Name of the operation that was attempted.
        operation: &'static str,
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Operation attempted while its preconditions do not hold.
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the violated precondition.
        message: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Decompressed output grew past the configured limit.
    #[error("Output limit exceeded: more than {limit} bytes")]
    OutputLimitExceeded {
        /// The configured limit in bytes.
        limit: u64,
    },
}

/// Result type alias for tiflate operations.
pub type Result<T> = std::result::Result<T, TiflateError>;

impl TiflateError {
    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid tree error.
    pub fn invalid_tree(message: impl Into<String>) -> Self {
        Self::InvalidTree {
            message: message.into(),
        }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create a capacity violation error.
    pub fn capacity(operation: &'static str, requested: usize, available: usize) -> Self {
        Self::CapacityViolation {
            operation,
            requested,
            available,
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an output limit error.
    pub fn output_limit(limit: u64) -> Self {
        Self::OutputLimitExceeded { limit }
    }

    /// Whether this error describes a malformed compressed stream.
    pub fn is_data_format(&self) -> bool {
        matches!(
            self,
            Self::InvalidHuffmanCode { .. }
                | Self::CorruptedData { .. }
                | Self::InvalidTree { .. }
                | Self::InvalidDistance { .. }
        )
    }

    /// Whether this error is an internal capacity violation.
    pub fn is_capacity_violation(&self) -> bool {
        matches!(self, Self::CapacityViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TiflateError::corrupted(12, "LEN/NLEN mismatch");
        assert!(err.to_string().contains("offset 12"));

        let err = TiflateError::invalid_distance(40000, 32768);
        assert!(err.to_string().contains("40000"));

        let err = TiflateError::capacity("write", 1, 0);
        assert!(err.to_string().contains("write"));
    }

    #[test]
    fn test_classification() {
        assert!(TiflateError::invalid_huffman(3).is_data_format());
        assert!(TiflateError::invalid_tree("over-subscribed").is_data_format());
        assert!(TiflateError::invalid_distance(2, 1).is_data_format());
        assert!(!TiflateError::capacity("repeat", 300, 10).is_data_format());
        assert!(TiflateError::capacity("repeat", 300, 10).is_capacity_violation());
        assert!(!TiflateError::invalid_state("window not empty").is_data_format());
        assert!(!TiflateError::unexpected_eof(1).is_data_format());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "sink closed");
        let err: TiflateError = io_err.into();
        assert!(matches!(err, TiflateError::Io(_)));
    }
}
