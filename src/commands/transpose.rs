//! Matrix transposition in bounded memory.
//!
//! Line-compressed destinations only accept whole lines appended in order,
//! so the source cannot be streamed line by line. Instead it is processed in
//! column blocks: each block reads a band of source columns across all
//! source lines, transposes the band in memory and appends the resulting
//! destination lines.
//!
//! # Memory Complexity
//!
//! At most [`TRANSPOSE_BUDGET`] bytes per block, and never less than one
//! destination line.

use super::Destination;
use crate::config;
use crate::error::{ErrorCode, MatrixError, Result, WithCode};
use crate::matrix::{Element, ElementKind, MatrixHandle, StorageVariant};
use crate::streaming::buffers::{transpose_block_width, TRANSPOSE_BUDGET};
use std::path::Path;

/// Transpose command configuration.
#[derive(Debug, Clone)]
pub struct TransposeCommand {
    /// Storage variant of the destination (default: the configured variant)
    pub variant: Option<StorageVariant>,
    /// Working set of one block in bytes
    pub budget: usize,
}

impl Default for TransposeCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics from a transposition.
#[derive(Debug, Default, Clone)]
pub struct TransposeStats {
    pub levels: u32,
    pub lines_written: u64,
    pub block_width: u32,
    pub blocks: u64,
}

impl std::fmt::Display for TransposeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "levels={}, lines written={}, blocks={} (width {})",
            self.levels, self.lines_written, self.blocks, self.block_width
        )
    }
}

impl TransposeCommand {
    pub fn new() -> Self {
        Self {
            variant: None,
            budget: TRANSPOSE_BUDGET,
        }
    }

    pub fn with_variant(mut self, variant: StorageVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Override the block budget.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Write the transpose of `src` to `dst`. `dst` may name `src` itself.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, src: P, dst: Q) -> Result<TransposeStats> {
        let mut source = MatrixHandle::open(src.as_ref()).with_code(ErrorCode::SourceOpen)?;
        let src_info = *source.info();
        let variant = config::output_variant(self.variant, src_info.kind, src_info.variant);
        let info = src_info.transposed().with_variant(variant);
        info.validate().with_code(ErrorCode::DestinationFormat)?;

        let dest =
            Destination::new(src.as_ref(), dst.as_ref()).with_code(ErrorCode::DestinationOpen)?;
        let mut target =
            MatrixHandle::create(dest.path(), info).with_code(ErrorCode::DestinationOpen)?;

        let stats = transpose_handles(&mut source, &mut target, self.budget)
            .with_code(ErrorCode::TransposeFailed)?;
        target.close().with_code(ErrorCode::TransposeFailed)?;
        drop(source);
        dest.commit().with_code(ErrorCode::TransposeFailed)?;
        Ok(stats)
    }
}

/// Transpose every level of `src` into `dst`, which must already have the
/// transposed shape.
pub fn transpose_handles(
    src: &mut MatrixHandle,
    dst: &mut MatrixHandle,
    budget: usize,
) -> Result<TransposeStats> {
    let info = *src.info();
    let expected = info.transposed();
    let actual = *dst.info();
    if (actual.levels, actual.lines, actual.columns)
        != (expected.levels, expected.lines, expected.columns)
    {
        return Err(MatrixError::Format(format!(
            "destination shape {}x{}x{} does not match transposed source {}x{}x{}",
            actual.levels,
            actual.lines,
            actual.columns,
            expected.levels,
            expected.lines,
            expected.columns
        )));
    }

    // Work in the destination's kind so integer sources stay exact.
    match actual.kind {
        ElementKind::Int32 => transpose_typed::<i32>(src, dst, budget),
        ElementKind::Float32 => transpose_typed::<f32>(src, dst, budget),
        ElementKind::Float64 => transpose_typed::<f64>(src, dst, budget),
    }
}

fn transpose_typed<T: Element>(
    src: &mut MatrixHandle,
    dst: &mut MatrixHandle,
    budget: usize,
) -> Result<TransposeStats> {
    let info = *src.info();
    let lines = info.lines as usize;
    let width = transpose_block_width(budget, T::KIND.size(), info.lines, info.columns);
    let mut stats = TransposeStats {
        levels: info.levels,
        block_width: width,
        ..Default::default()
    };

    let mut block = vec![T::default(); width as usize * lines];
    let mut out = vec![T::default(); lines];

    for level in 0..info.levels {
        let mut first = 0u32;
        while first < info.columns {
            let w = width.min(info.columns - first) as usize;

            // block[line * w + j] = src[level][line][first + j]
            for line in 0..info.lines {
                let start = line as usize * w;
                let got = src.get(&mut block[start..start + w], level, line, first)?;
                if got != w {
                    return Err(MatrixError::ShortRead {
                        level,
                        line,
                        got,
                        expected: w,
                    });
                }
            }

            for j in 0..w {
                for (line, v) in out.iter_mut().enumerate() {
                    *v = block[line * w + j];
                }
                dst.write_line(&out, level, first + j as u32)?;
                stats.lines_written += 1;
            }

            stats.blocks += 1;
            first += w as u32;
        }
    }
    Ok(stats)
}
