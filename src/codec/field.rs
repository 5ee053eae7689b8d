//! Zig-zag folding and the extensible field.
//!
//! An extensible field of `w` bits stores values up to `2^w - 5` directly
//! (0..=59 for 6 bits, 0..=27 for 5 bits). Larger values store
//! `direct_max + n` in the field, where `n` in 1..=4 is the number of extra
//! bytes that follow. The extra bytes are a little-endian bijective base-256
//! number: the value is `direct_max + sum((b_i + 1) << (8 * i))`.

use super::{DecodeError, TokenReader};

/// Fold a signed delta onto the unsigned integers: 0, -1, 1, -2, 2, ...
#[inline]
pub fn zigzag(d: i32) -> u32 {
    ((d << 1) ^ (d >> 31)) as u32
}

/// Inverse of [`zigzag`].
#[inline]
pub fn unzigzag(z: u32) -> i32 {
    ((z >> 1) as i32) ^ -((z & 1) as i32)
}

#[inline]
const fn direct_max(bits: u32) -> u32 {
    (1 << bits) - 5
}

/// Append a token byte `tag | field` and any extra bytes for `value`.
pub(crate) fn write_extensible(out: &mut Vec<u8>, tag: u8, bits: u32, value: u32) {
    let direct = direct_max(bits);
    if value <= direct {
        out.push(tag | value as u8);
        return;
    }

    let mut extra = [0u8; 4];
    let mut n = 0;
    let mut rest = u64::from(value - direct);
    while rest > 0 {
        rest -= 1;
        extra[n] = (rest & 0xff) as u8;
        rest >>= 8;
        n += 1;
    }
    out.push(tag | (direct + n as u32) as u8);
    out.extend_from_slice(&extra[..n]);
}

/// Read the value of an extensible field whose low `bits` are in `byte`.
pub(crate) fn read_extensible(
    reader: &mut TokenReader<'_>,
    byte: u8,
    bits: u32,
    produced: usize,
    expected: usize,
) -> Result<u32, DecodeError> {
    let direct = direct_max(bits);
    let field = u32::from(byte) & ((1 << bits) - 1);
    if field <= direct {
        return Ok(field);
    }

    let offset = reader.offset();
    let n = (field - direct) as usize;
    let extra = reader
        .take(n)
        .ok_or(DecodeError::Exhausted { produced, expected })?;
    let rest = extra
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc + ((u64::from(b) + 1) << (8 * i)));

    u32::try_from(u64::from(direct) + rest).map_err(|_| DecodeError::FieldOverflow { offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_one(bytes: &[u8], bits: u32) -> u32 {
        let mut reader = TokenReader::new(bytes);
        let byte = reader.next_byte().unwrap();
        let value = read_extensible(&mut reader, byte, bits, 0, 1).unwrap();
        reader.finish(1).unwrap();
        value
    }

    #[test]
    fn test_zigzag_mapping() {
        assert_eq!(zigzag(0), 0);
        assert_eq!(zigzag(-1), 1);
        assert_eq!(zigzag(1), 2);
        assert_eq!(zigzag(-2), 3);
        assert_eq!(zigzag(i32::MAX), u32::MAX - 1);
        assert_eq!(zigzag(i32::MIN), u32::MAX);
        for d in [-1000, -33, -32, -1, 0, 1, 31, 32, 1000, i32::MIN, i32::MAX] {
            assert_eq!(unzigzag(zigzag(d)), d);
        }
    }

    #[test]
    fn test_direct_values() {
        let mut out = Vec::new();
        write_extensible(&mut out, 0xc0, 6, 59);
        assert_eq!(out, vec![0xc0 | 59]);

        out.clear();
        write_extensible(&mut out, 0x80, 5, 27);
        assert_eq!(out, vec![0x80 | 27]);
    }

    #[test]
    fn test_extra_byte_boundaries() {
        // (value, expected extra byte count) for a 6-bit field
        let cases = [
            (60u32, 1usize),
            (59 + 256, 1),
            (59 + 257, 2),
            (59 + 256 + 65536, 2),
            (59 + 256 + 65536 + 1, 3),
            (u32::MAX, 4),
        ];
        for (value, extra) in cases {
            let mut out = Vec::new();
            write_extensible(&mut out, 0xc0, 6, value);
            assert_eq!(out.len(), 1 + extra, "value {}", value);
            assert_eq!(u32::from(out[0] & 0x3f), 59 + extra as u32);
            assert_eq!(decode_one(&out, 6), value);
        }
    }

    #[test]
    fn test_first_extended_value_encodes_zero_byte() {
        let mut out = Vec::new();
        write_extensible(&mut out, 0x80, 5, 28);
        assert_eq!(out, vec![0x80 | 28, 0x00]);
    }

    #[test]
    fn test_truncated_field_is_exhausted() {
        let mut reader = TokenReader::new(&[0xc0 | 61, 0x01]);
        let byte = reader.next_byte().unwrap();
        let err = read_extensible(&mut reader, byte, 6, 3, 4).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Exhausted {
                produced: 3,
                expected: 4
            }
        );
    }

    #[test]
    fn test_field_overflow() {
        let bytes = [0xc0 | 63, 0xff, 0xff, 0xff, 0xff];
        let mut reader = TokenReader::new(&bytes);
        let byte = reader.next_byte().unwrap();
        let err = read_extensible(&mut reader, byte, 6, 0, 1).unwrap_err();
        assert!(matches!(err, DecodeError::FieldOverflow { .. }));
    }
}
