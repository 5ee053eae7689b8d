//! Line codec for compressed matrix storage.
//!
//! A line of signed 32-bit counts is delta coded against a running value
//! `last` (reset to 0 at the start of every line), zig-zag folded, and packed
//! into byte tokens. The top two bits of each token's leading byte select the
//! token kind:
//!
//! | Tag  | V1                          | V2                                   |
//! |------|-----------------------------|--------------------------------------|
//! | `00` | three 2-bit deltas          | three 2-bit deltas                   |
//! | `01` | two 3-bit deltas            | two 3-bit deltas                     |
//! | `10` | one 6-bit delta             | `0`: single value, 5-bit field       |
//! |      |                             | `1`: run-length, 5-bit field         |
//! | `11` | single value, 6-bit field   | (invalid)                            |
//!
//! Fields marked "field" are extensible: see [`field`] for the exact rule.
//!
//! The byte stream is compatibility-critical. In particular a V2 run-length
//! token never updates `last`, neither for its leading value nor for the
//! repeats.

mod field;
mod v1;
mod v2;

pub use field::{unzigzag, zigzag};

use thiserror::Error;

/// Errors produced while decoding a compressed line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("compressed line exhausted after {produced} of {expected} values")]
    Exhausted { produced: usize, expected: usize },

    #[error("token at byte {offset} produces {produced} values but only {remaining} remain")]
    Overrun {
        offset: usize,
        produced: u64,
        remaining: usize,
    },

    #[error("{extra} trailing bytes after {expected} values")]
    TrailingBytes { extra: usize, expected: usize },

    #[error("invalid token 0x{byte:02x} at byte {offset}")]
    InvalidToken { byte: u8, offset: usize },

    #[error("extensible field at byte {offset} exceeds 32 bits")]
    FieldOverflow { offset: usize },
}

/// Codec generation used for a compressed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineCodec {
    V1,
    V2,
}

impl LineCodec {
    /// Compress one line into a new byte vector.
    pub fn compress(self, values: &[i32]) -> Vec<u8> {
        let mut out = Vec::with_capacity(values.len() / 2 + 8);
        self.compress_into(values, &mut out);
        out
    }

    /// Compress one line, appending the encoded bytes to `out`.
    pub fn compress_into(self, values: &[i32], out: &mut Vec<u8>) {
        match self {
            LineCodec::V1 => v1::encode(values, out),
            LineCodec::V2 => v2::encode(values, out),
        }
    }

    /// Decompress exactly `count` values.
    pub fn decompress(self, bytes: &[u8], count: usize) -> Result<Vec<i32>, DecodeError> {
        let mut out = vec![0; count];
        self.decompress_into(bytes, &mut out)?;
        Ok(out)
    }

    /// Decompress exactly `out.len()` values into `out`.
    ///
    /// The whole of `bytes` must be consumed.
    pub fn decompress_into(self, bytes: &[u8], out: &mut [i32]) -> Result<(), DecodeError> {
        match self {
            LineCodec::V1 => v1::decode(bytes, out),
            LineCodec::V2 => v2::decode(bytes, out),
        }
    }
}

pub(crate) const TAG_MASK: u8 = 0xc0;
pub(crate) const TAG_TRIPLE: u8 = 0x00;
pub(crate) const TAG_PAIR: u8 = 0x40;
pub(crate) const TAG_10: u8 = 0x80;
pub(crate) const TAG_11: u8 = 0xc0;

/// Try to pack the next three values as 2-bit deltas.
#[inline]
pub(crate) fn pack_triple(values: &[i32], last: i32) -> Option<u8> {
    if values.len() < 3 {
        return None;
    }
    let z0 = zigzag(values[0].wrapping_sub(last));
    let z1 = zigzag(values[1].wrapping_sub(values[0]));
    let z2 = zigzag(values[2].wrapping_sub(values[1]));
    if (z0 | z1 | z2) > 0x3 {
        return None;
    }
    Some(TAG_TRIPLE | (z0 << 4 | z1 << 2 | z2) as u8)
}

/// Try to pack the next two values as 3-bit deltas.
#[inline]
pub(crate) fn pack_pair(values: &[i32], last: i32) -> Option<u8> {
    if values.len() < 2 {
        return None;
    }
    let z0 = zigzag(values[0].wrapping_sub(last));
    let z1 = zigzag(values[1].wrapping_sub(values[0]));
    if (z0 | z1) > 0x7 {
        return None;
    }
    Some(TAG_PAIR | (z0 << 3 | z1) as u8)
}

/// Byte cursor over one compressed line.
pub(crate) struct TokenReader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> TokenReader<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.input.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    #[inline]
    pub(crate) fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.input.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    pub(crate) fn finish(&self, expected: usize) -> Result<(), DecodeError> {
        let extra = self.input.len() - self.pos;
        if extra > 0 {
            return Err(DecodeError::TrailingBytes { extra, expected });
        }
        Ok(())
    }
}

/// Output side of a decoder: a fixed-size slice filled front to back.
pub(crate) struct LineSink<'a> {
    out: &'a mut [i32],
    len: usize,
}

impl<'a> LineSink<'a> {
    pub(crate) fn new(out: &'a mut [i32]) -> Self {
        Self { out, len: 0 }
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.out.len()
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.out.len() - self.len
    }

    #[inline]
    pub(crate) fn produced(&self) -> usize {
        self.len
    }

    pub(crate) fn expected(&self) -> usize {
        self.out.len()
    }

    /// Reserve room for a token producing `n` values.
    #[inline]
    pub(crate) fn reserve(&self, n: u64, offset: usize) -> Result<(), DecodeError> {
        if n > self.remaining() as u64 {
            return Err(DecodeError::Overrun {
                offset,
                produced: n,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Push a value; callers must have reserved room first.
    #[inline]
    pub(crate) fn push(&mut self, value: i32) {
        self.out[self.len] = value;
        self.len += 1;
    }

    #[inline]
    pub(crate) fn fill(&mut self, value: i32, n: usize) {
        self.out[self.len..self.len + n].fill(value);
        self.len += n;
    }
}

/// Decode the delta tokens shared by both generations (`00` and `01`).
///
/// Returns `false` if `byte` carries another tag.
#[inline]
pub(crate) fn decode_packed(
    byte: u8,
    offset: usize,
    last: &mut i32,
    sink: &mut LineSink<'_>,
) -> Result<bool, DecodeError> {
    match byte & TAG_MASK {
        TAG_TRIPLE => {
            sink.reserve(3, offset)?;
            for shift in [4, 2, 0] {
                *last = last.wrapping_add(unzigzag(u32::from(byte >> shift) & 0x3));
                sink.push(*last);
            }
            Ok(true)
        }
        TAG_PAIR => {
            sink.reserve(2, offset)?;
            for shift in [3, 0] {
                *last = last.wrapping_add(unzigzag(u32::from(byte >> shift) & 0x7));
                sink.push(*last);
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}
