//! First generation line codec: packed deltas only, no run-length tokens.

use super::field::{read_extensible, unzigzag, write_extensible, zigzag};
use super::{
    decode_packed, pack_pair, pack_triple, DecodeError, LineSink, TokenReader, TAG_10, TAG_11,
    TAG_MASK,
};

const FIELD_BITS: u32 = 6;

pub(super) fn encode(values: &[i32], out: &mut Vec<u8>) {
    let mut last = 0i32;
    let mut i = 0;

    while i < values.len() {
        let rest = &values[i..];
        if let Some(byte) = pack_triple(rest, last) {
            out.push(byte);
            last = rest[2];
            i += 3;
        } else if let Some(byte) = pack_pair(rest, last) {
            out.push(byte);
            last = rest[1];
            i += 2;
        } else {
            let z = zigzag(rest[0].wrapping_sub(last));
            if z <= 0x3f {
                out.push(TAG_10 | z as u8);
            } else {
                write_extensible(out, TAG_11, FIELD_BITS, z);
            }
            last = rest[0];
            i += 1;
        }
    }
}

pub(super) fn decode(input: &[u8], out: &mut [i32]) -> Result<(), DecodeError> {
    let mut reader = TokenReader::new(input);
    let mut sink = LineSink::new(out);
    let mut last = 0i32;

    while !sink.is_full() {
        let offset = reader.offset();
        let byte = reader.next_byte().ok_or(DecodeError::Exhausted {
            produced: sink.produced(),
            expected: sink.expected(),
        })?;

        if decode_packed(byte, offset, &mut last, &mut sink)? {
            continue;
        }

        let z = if byte & TAG_MASK == TAG_10 {
            u32::from(byte & 0x3f)
        } else {
            read_extensible(
                &mut reader,
                byte,
                FIELD_BITS,
                sink.produced(),
                sink.expected(),
            )?
        };
        sink.reserve(1, offset)?;
        last = last.wrapping_add(unzigzag(z));
        sink.push(last);
    }

    reader.finish(sink.expected())
}

#[cfg(test)]
mod tests {
    use crate::codec::LineCodec;

    #[test]
    fn test_six_bit_token_range() {
        // +31 and -32 are the extremes of the 6-bit token.
        assert_eq!(LineCodec::V1.compress(&[31]), vec![0x80 | 62]);
        assert_eq!(LineCodec::V1.compress(&[-32]), vec![0x80 | 63]);
    }

    #[test]
    fn test_extensible_token_beyond_six_bits() {
        // +32 folds to 64: field 60 (one extra byte), extra byte 64 - 59 - 1.
        assert_eq!(LineCodec::V1.compress(&[32]), vec![0xc0 | 60, 4]);
        // +100 folds to 200.
        assert_eq!(LineCodec::V1.compress(&[100]), vec![0xc0 | 60, 140]);
        assert_eq!(
            LineCodec::V1.decompress(&[0xc0 | 60, 140], 1).unwrap(),
            vec![100]
        );
    }

    #[test]
    fn test_greedy_prefers_most_values_per_byte() {
        // Three small deltas, then one that only fits the pair token, then a single.
        let values = [1, 2, 3, 6, 6, 36];
        let bytes = LineCodec::V1.compress(&values);
        assert_eq!(bytes[0] & 0xc0, 0x00);
        assert_eq!(bytes[1] & 0xc0, 0x40);
        assert_eq!(bytes[2] & 0xc0, 0x80);
        assert_eq!(bytes.len(), 3);
        assert_eq!(LineCodec::V1.decompress(&bytes, values.len()).unwrap(), values);
    }

    #[test]
    fn test_run_is_not_special_in_v1() {
        // Twelve zeros pack as four triple tokens.
        assert_eq!(LineCodec::V1.compress(&[0; 12]), vec![0; 4]);
    }
}
