//! Decoder configuration.

/// How strictly dynamic Huffman code lengths are validated.
///
/// Over-subscribed code sets (more codes than the bit lengths allow) are
/// always rejected. The policies differ only on incomplete sets, which leave
/// part of the code space unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreePolicy {
    /// Accept incomplete code sets. Some encoders in the wild emit them, and
    /// files they produced have always decoded. Hitting an unassigned code
    /// while decoding is still an error.
    #[default]
    Permissive,
    /// Reject incomplete code sets, except the single-code and empty sets
    /// RFC 1951 allows.
    Strict,
}

/// Inflate configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InflateConfig {
    /// Validation applied to Huffman code lengths.
    pub tree_policy: TreePolicy,
    /// Maximum number of decompressed bytes, if bounded.
    pub output_limit: Option<u64>,
}

impl InflateConfig {
    /// Configuration for TIFF Deflate strips and tiles.
    ///
    /// - Permissive tree validation
    /// - Unbounded output
    pub const TIFF: Self = Self {
        tree_policy: TreePolicy::Permissive,
        output_limit: None,
    };

    /// Strict RFC 1951 validation.
    ///
    /// - Incomplete Huffman trees rejected
    /// - Unbounded output
    pub const STRICT: Self = Self {
        tree_policy: TreePolicy::Strict,
        output_limit: None,
    };

    /// Create the default configuration.
    pub fn new() -> Self {
        Self::TIFF
    }

    /// Set the Huffman tree validation policy.
    pub fn with_tree_policy(mut self, policy: TreePolicy) -> Self {
        self.tree_policy = policy;
        self
    }

    /// Bound the number of decompressed bytes.
    ///
    /// A TIFF reader knows the expected strip size from the image geometry
    /// and can use it here to stop runaway streams early.
    pub fn with_output_limit(mut self, limit: u64) -> Self {
        self.output_limit = Some(limit);
        self
    }
}
