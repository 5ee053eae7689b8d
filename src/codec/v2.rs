//! Second generation line codec: adds run-length tokens.
//!
//! A run-length token carries a one-bit zig-zag delta for a leading value
//! (`last` or `last - 1`) followed by `repeats` copies of `last`, with
//! `repeats >= 3`. Its 5-bit extensible field holds `(repeats - 3) << 1 | diff`.
//! `last` is not updated by the token.

use super::field::{read_extensible, unzigzag, write_extensible, zigzag};
use super::{
    decode_packed, pack_pair, pack_triple, DecodeError, LineSink, TokenReader, TAG_10, TAG_MASK,
};

const FIELD_BITS: u32 = 5;
const RUN_FLAG: u8 = 0x20;
const MIN_REPEATS: usize = 3;
const MAX_REPEATS: usize = (u32::MAX >> 1) as usize + MIN_REPEATS;

/// A run starting at the current position: leading delta plus repeat count.
struct Run {
    diff: u32,
    repeats: usize,
}

#[inline]
fn run_at(values: &[i32], last: i32) -> Option<Run> {
    if values.len() <= MIN_REPEATS {
        return None;
    }
    let diff = zigzag(values[0].wrapping_sub(last));
    if diff > 1 {
        return None;
    }
    let repeats = values[1..]
        .iter()
        .take(MAX_REPEATS)
        .take_while(|&&v| v == last)
        .count();
    (repeats >= MIN_REPEATS).then_some(Run { diff, repeats })
}

pub(super) fn encode(values: &[i32], out: &mut Vec<u8>) {
    let mut last = 0i32;
    let mut i = 0;

    while i < values.len() {
        let rest = &values[i..];
        if let Some(run) = run_at(rest, last) {
            let field = ((run.repeats - MIN_REPEATS) as u32) << 1 | run.diff;
            write_extensible(out, TAG_10 | RUN_FLAG, FIELD_BITS, field);
            i += run.repeats + 1;
        } else if let Some(byte) = pack_triple(rest, last) {
            out.push(byte);
            last = rest[2];
            i += 3;
        } else if let Some(byte) = pack_pair(rest, last) {
            out.push(byte);
            last = rest[1];
            i += 2;
        } else {
            let z = zigzag(rest[0].wrapping_sub(last));
            write_extensible(out, TAG_10, FIELD_BITS, z);
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
        if byte & TAG_MASK != TAG_10 {
            return Err(DecodeError::InvalidToken { byte, offset });
        }

        let field = read_extensible(
            &mut reader,
            byte,
            FIELD_BITS,
            sink.produced(),
            sink.expected(),
        )?;

        if byte & RUN_FLAG == 0 {
            sink.reserve(1, offset)?;
            last = last.wrapping_add(unzigzag(field));
            sink.push(last);
        } else {
            let repeats = u64::from(field >> 1) + MIN_REPEATS as u64;
            sink.reserve(repeats + 1, offset)?;
            sink.push(last.wrapping_add(unzigzag(field & 1)));
            sink.fill(last, repeats as usize);
        }
    }

    reader.finish(sink.expected())
}
