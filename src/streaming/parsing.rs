//! Zero-allocation text matrix parsing utilities.
//!
//! Text matrices hold one line per row with values separated by tabs or
//! spaces. A blank line separates levels; lines starting with `#` are
//! comments.

use memchr::memchr;

/// Iterator over the lines of a byte buffer, without line terminators.
pub struct Lines<'a> {
    data: &'a [u8],
    pos: usize,
    line_number: usize,
}

impl<'a> Lines<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            line_number: 0,
        }
    }

    /// 1-based number of the line returned last.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.pos >= self.data.len() {
            return None;
        }
        let rest = &self.data[self.pos..];
        let (line, advance) = match memchr(b'\n', rest) {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        self.pos += advance;
        self.line_number += 1;
        Some(line.strip_suffix(b"\r").unwrap_or(line))
    }
}

/// Check whether a line is a comment.
#[inline]
pub fn is_comment(line: &[u8]) -> bool {
    line.first() == Some(&b'#')
}

/// Check whether a line holds nothing but whitespace.
#[inline]
pub fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| b.is_ascii_whitespace())
}

/// Split a line into fields separated by runs of tabs or spaces.
#[inline]
pub fn fields(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|b| *b == b'\t' || *b == b' ')
        .filter(|f| !f.is_empty())
}
