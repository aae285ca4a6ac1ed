//! Helpers for hand-assembling DEFLATE bitstreams in unit tests.

use crate::huffman::MAX_CODE_LENGTH;

/// LSB-first bit packer.
#[derive(Debug, Default)]
pub(crate) struct BitPacker {
    out: Vec<u8>,
    acc: u64,
    bits: u32,
}

impl BitPacker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append `count` bits of `value`, least significant first.
    pub(crate) fn bits(&mut self, value: u32, count: u8) -> &mut Self {
        self.acc |= (value as u64) << self.bits;
        self.bits += count as u32;
        while self.bits >= 8 {
            self.out.push(self.acc as u8);
            self.acc >>= 8;
            self.bits -= 8;
        }
        self
    }

    /// Append a Huffman code, most significant bit first.
    pub(crate) fn code(&mut self, code: u32, length: u8) -> &mut Self {
        for i in (0..length).rev() {
            self.bits((code >> i) & 1, 1);
        }
        self
    }

    /// Append a fixed-table literal/length symbol.
    pub(crate) fn fixed_litlen(&mut self, symbol: u16) -> &mut Self {
        let (code, length) = fixed_litlen_code(symbol);
        self.code(code, length)
    }

    /// Zero-pad to the next byte boundary.
    pub(crate) fn align(&mut self) -> &mut Self {
        if self.bits > 0 {
            let pad = 8 - self.bits as u8;
            self.bits(0, pad);
        }
        self
    }

    pub(crate) fn finish(&mut self) -> Vec<u8> {
        self.align();
        std::mem::take(&mut self.out)
    }
}

/// Fixed literal/length code (MSB-first) for a symbol, per RFC 1951 3.2.6.
pub(crate) fn fixed_litlen_code(symbol: u16) -> (u32, u8) {
    let symbol = symbol as u32;
    match symbol {
        0..=143 => (0x30 + symbol, 8),
        144..=255 => (0x190 + symbol - 144, 9),
        256..=279 => (symbol - 256, 7),
        _ => (0xC0 + symbol - 280, 8),
    }
}

/// Canonical MSB-first codes `(symbol, code, length)` for the used symbols.
pub(crate) fn canonical_codes(lengths: &[u8]) -> Vec<(u16, u32, u8)> {
    let mut bl_count = [0u32; MAX_CODE_LENGTH + 1];
    for &len in lengths {
        bl_count[len as usize] += 1;
    }
    bl_count[0] = 0;

    let mut next_code = [0u32; MAX_CODE_LENGTH + 1];
    let mut code = 0u32;
    for bits in 1..=MAX_CODE_LENGTH {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    let mut codes = Vec::new();
    for (symbol, &len) in lengths.iter().enumerate() {
        if len > 0 {
            codes.push((symbol as u16, next_code[len as usize], len));
            next_code[len as usize] += 1;
        }
    }
    codes
}

/// A fixed-Huffman stream for `"AAAAAAAAAA"`: literal `'A'`, then a match
/// of length 9 at distance 1, then end of block.
pub(crate) fn ten_a_fixed_stream() -> Vec<u8> {
    BitPacker::new()
        .bits(1, 1) // BFINAL
        .bits(1, 2) // BTYPE = fixed
        .fixed_litlen(b'A' as u16)
        .fixed_litlen(263) // length 9
        .code(0, 5) // distance code 0 = distance 1
        .fixed_litlen(256)
        .finish()
}
