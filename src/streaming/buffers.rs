//! Buffer size constants for matrix operations.
//!
//! These bound the memory used by whole-matrix operations regardless of
//! matrix size.

/// Working set for one transpose block (16 MB).
pub const TRANSPOSE_BUDGET: usize = 16 * 1024 * 1024;

/// Working set for one column band of the column cache (16 MB).
pub const COLUMN_BAND_BUDGET: usize = 16 * 1024 * 1024;

/// Write buffer for matrix files (256 KB).
pub const MATRIX_WRITE_BUFFER: usize = 256 * 1024;

/// Output buffer for text dumps (2 MB).
pub const TEXT_OUTPUT_BUFFER: usize = 2 * 1024 * 1024;

/// Number of destination lines per transpose block.
///
/// The block holds `width * lines` elements of `element_size` bytes and never
/// exceeds `budget`, except that it is always at least one line wide.
#[inline]
pub const fn transpose_block_width(
    budget: usize,
    element_size: usize,
    lines: u32,
    columns: u32,
) -> u32 {
    let per_line = element_size * if lines == 0 { 1 } else { lines as usize };
    let width = budget / per_line;
    if width == 0 {
        1
    } else if width > columns as usize {
        if columns == 0 {
            1
        } else {
            columns
        }
    } else {
        width as u32
    }
}
