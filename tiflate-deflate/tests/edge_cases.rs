//! Edge case tests for DEFLATE decompression.
//!
//! Streams are produced by `miniz_oxide`, an independent encoder.

use miniz_oxide::deflate::compress_to_vec;
use tiflate_core::TiflateError;
use tiflate_core::cursor::StreamCursor;
use tiflate_deflate::{
    InflateConfig, InflateStatus, Inflater, inflate, inflate_with_config,
    inflate_with_dictionary,
};

fn deflate(input: &[u8], level: u8) -> Vec<u8> {
    compress_to_vec(input, level)
}

#[test]
fn test_empty_input() {
    let input = b"";
    let compressed = deflate(input, 6);
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_single_byte() {
    let input = b"A";
    let compressed = deflate(input, 6);
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_run_encoded_as_literal_and_match() {
    // A run of ten bytes is one literal followed by a length 9 match at
    // distance 1.
    let input = b"AAAAAAAAAA";
    let compressed = deflate(input, 6);

    let mut inflater = Inflater::new();
    let mut cursor = StreamCursor::new(compressed);
    let mut output = Vec::new();
    let status = inflater.decompress_to(&mut cursor, &mut output).unwrap();

    assert_eq!(status, InflateStatus::Done);
    assert_eq!(output, input);
    let stats = inflater.stats();
    assert_eq!(stats.literals, 1);
    assert_eq!(stats.matches, 1);
    assert_eq!(stats.bytes_out, 10);
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let compressed = deflate(&input, 6);
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_all_same_byte() {
    let input = vec![255u8; 5000];
    let compressed = deflate(&input, 6);
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_max_match_length() {
    // Runs of 258 bytes exercise the longest length code
    let pattern = vec![42u8; 258];
    let mut input = Vec::new();
    for _ in 0..10 {
        input.extend_from_slice(&pattern);
    }

    let compressed = deflate(&input, 9);
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_alternating_pattern() {
    let mut input = Vec::with_capacity(2000);
    for i in 0..1000 {
        input.push(if i % 2 == 0 { b'A' } else { b'B' });
    }

    let compressed = deflate(&input, 6);
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_large_input() {
    // 1MB of data: far more than one window
    let mut input = Vec::with_capacity(1024 * 1024);
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    while input.len() < 1024 * 1024 {
        input.extend_from_slice(pattern);
    }
    input.truncate(1024 * 1024);

    let compressed = deflate(&input, 5);
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
    assert_eq!(decompressed.len(), 1024 * 1024);
}

#[test]
fn test_incremental_pattern() {
    let mut input = Vec::new();
    for i in 0..256 {
        for _ in 0..10 {
            input.push(i as u8);
        }
    }

    for level in [1, 6, 9] {
        let compressed = deflate(&input, level);
        let decompressed = inflate(&compressed).unwrap();
        assert_eq!(decompressed, input, "Level {} failed", level);
    }
}

#[test]
fn test_compression_levels() {
    let input = b"Hello, world! This is a test of DEFLATE compression with various levels.";

    for level in 0..=10 {
        let compressed = deflate(input, level);
        let decompressed = inflate(&compressed).unwrap();
        assert_eq!(decompressed, input, "Level {} failed", level);

        // Level 0 emits stored blocks
        if level == 0 {
            assert!(compressed.len() > input.len());
        }
    }
}

#[test]
fn test_binary_data() {
    // Binary data with all byte values
    let input: Vec<u8> = (0..=255).cycle().take(5000).collect();

    let compressed = deflate(&input, 6);
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_long_distance_match() {
    // A match at the maximum distance (32KB)
    let mut input = vec![0u8; 32768 + 16];
    let pattern = b"PATTERN_TO_MATCH";
    input[0..pattern.len()].copy_from_slice(pattern);
    input[32768..32768 + pattern.len()].copy_from_slice(pattern);

    for level in [1, 9] {
        let compressed = deflate(&input, level);
        let decompressed = inflate(&compressed).unwrap();
        assert_eq!(decompressed, input);
    }
}

#[test]
fn test_stored_over_64k() {
    // Stored blocks hold at most 65535 bytes, so this takes several
    let input: Vec<u8> = (0..200_000u32).map(|i| (i * 7 + i / 251) as u8).collect();
    let compressed = deflate(&input, 0);
    assert_eq!(inflate(&compressed).unwrap(), input);
}

#[test]
fn test_strict_config_accepts_encoder_output() {
    let input: Vec<u8> = b"strip row ".iter().cycle().take(4096).copied().collect();
    let compressed = deflate(&input, 6);
    let decompressed = inflate_with_config(&compressed, InflateConfig::STRICT).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_output_limit_guard() {
    let input = vec![7u8; 100_000];
    let compressed = deflate(&input, 6);

    let exact = InflateConfig::new().with_output_limit(100_000);
    assert_eq!(inflate_with_config(&compressed, exact).unwrap(), input);

    let short = InflateConfig::new().with_output_limit(99_999);
    let err = inflate_with_config(&compressed, short).unwrap_err();
    assert!(err.to_string().contains("99999"));
}

#[test]
fn test_truncated_input() {
    let input: Vec<u8> = (0..10_000u32).map(|i| (i % 97) as u8).collect();
    let compressed = deflate(&input, 6);

    for cut in [1, compressed.len() / 2, compressed.len() - 1] {
        let err = inflate(&compressed[..cut]).unwrap_err();
        assert!(
            matches!(err, TiflateError::UnexpectedEof { .. }),
            "cut at {}: {}",
            cut,
            err
        );
    }
}

#[test]
fn test_garbage_input_never_panics() {
    let mut seed: u64 = 0x9E3779B97F4A7C15;
    for _ in 0..200 {
        let data: Vec<u8> = (0..64)
            .map(|_| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                (seed >> 33) as u8
            })
            .collect();
        let _ = inflate(&data);
    }
}

/// Fixed block with a single match of length 3 at `distance`.
fn fixed_match_stream(distance_code: u32, extra: u32, extra_bits: u8) -> Vec<u8> {
    let mut fields: Vec<(u32, u8)> = vec![(1, 1), (1, 2)];
    // Length symbol 257 (code 0000001) and distance code, both MSB-first
    fields.extend(msb_first(0b0000001, 7));
    fields.extend(msb_first(distance_code, 5));
    fields.push((extra, extra_bits));
    // End of block (0000000)
    fields.extend(msb_first(0, 7));

    let mut out = Vec::new();
    let (mut acc, mut bits) = (0u64, 0u32);
    for (value, count) in fields {
        acc |= (value as u64) << bits;
        bits += count as u32;
        while bits >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push(acc as u8);
    }
    out
}

fn msb_first(code: u32, length: u8) -> Vec<(u32, u8)> {
    (0..length).rev().map(|i| ((code >> i) & 1, 1)).collect()
}

#[test]
fn test_dictionary_keeps_last_32k() {
    let dictionary: Vec<u8> = (0..40_000u32).map(|i| (i % 251) as u8).collect();

    // Distance code 29 + 8191 extra = 32768
    let stream = fixed_match_stream(29, 8191, 13);
    let output = inflate_with_dictionary(&stream, &dictionary).unwrap();

    let start = dictionary.len() - 32768;
    assert_eq!(output, &dictionary[start..start + 3]);
}

#[test]
fn test_dictionary_distance_beyond_history() {
    let dictionary = vec![b'd'; 100];

    // Distance code 12 + 4 extra = 69, within the dictionary
    let stream = fixed_match_stream(12, 4, 5);
    assert_eq!(inflate_with_dictionary(&stream, &dictionary).unwrap(), b"ddd");

    // Distance code 13 + 4 extra = 101, one past it
    let stream = fixed_match_stream(13, 4, 5);
    let err = inflate_with_dictionary(&stream, &dictionary).unwrap_err();
    assert!(err.is_data_format());
}
