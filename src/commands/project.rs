//! Axis projections of a matrix.
//!
//! For every level the row-sum projection adds all lines together (one
//! value per column) and the column-sum projection reduces every line to
//! its total (one value per line). Each output matrix has the source's
//! levels, one line per level, and the source's element kind.
//!
//! # Memory Complexity
//!
//! O(lines + columns) per level, regardless of matrix size.

use crate::config;
use crate::error::{ErrorCode, MatrixError, Result, WithCode};
use crate::matrix::{Element, ElementKind, MatrixHandle, MatrixInfo, StorageVariant};
use std::path::Path;

/// Projections only support singles and prompt/random pairs.
pub const MAX_PROJECT_LEVELS: u32 = 2;

/// Projection command configuration.
#[derive(Debug, Clone, Default)]
pub struct ProjectCommand {
    /// Storage variant of the outputs (default: the configured variant)
    pub variant: Option<StorageVariant>,
}

/// Statistics from a projection.
#[derive(Debug, Default, Clone)]
pub struct ProjectStats {
    pub levels: u32,
    pub lines_read: u64,
    /// Grand total of the source over all levels.
    pub total: f64,
    pub row_sum_written: bool,
    pub col_sum_written: bool,
}

impl std::fmt::Display for ProjectStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "levels={}, lines={}, total={}, row-sum={}, col-sum={}",
            self.levels,
            self.lines_read,
            self.total,
            if self.row_sum_written { "yes" } else { "no" },
            if self.col_sum_written { "yes" } else { "no" }
        )
    }
}

impl ProjectCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variant(mut self, variant: StorageVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Project `src` into the row-sum and/or column-sum matrices.
    ///
    /// An absent or empty output path skips that projection.
    pub fn run<P: AsRef<Path>>(
        &self,
        src: P,
        row_sum: Option<&Path>,
        col_sum: Option<&Path>,
    ) -> Result<ProjectStats> {
        let row_sum = row_sum.filter(|p| !p.as_os_str().is_empty());
        let col_sum = col_sum.filter(|p| !p.as_os_str().is_empty());

        let mut src = MatrixHandle::open(src).with_code(ErrorCode::SourceOpen)?;
        let info = *src.info();
        if info.levels > MAX_PROJECT_LEVELS {
            return Err(MatrixError::TooManyLevels {
                levels: info.levels,
            }
            .with_code(ErrorCode::ProjectFailed));
        }

        let variant = config::output_variant(self.variant, info.kind, info.variant);
        let mut row_out = row_sum
            .map(|path| {
                let out = MatrixInfo::new(info.levels, 1, info.columns)
                    .with_kind(info.kind)
                    .with_variant(variant);
                create_output(path, out, ErrorCode::RowSumFormat, ErrorCode::RowSumOpen)
            })
            .transpose()?;
        let mut col_out = col_sum
            .map(|path| {
                let out = MatrixInfo::new(info.levels, 1, info.lines)
                    .with_kind(info.kind)
                    .with_variant(variant);
                create_output(path, out, ErrorCode::ColSumFormat, ErrorCode::ColSumOpen)
            })
            .transpose()?;

        let mut stats = ProjectStats {
            levels: info.levels,
            ..Default::default()
        };
        if row_out.is_none() && col_out.is_none() {
            return Ok(stats);
        }

        let outputs = Outputs {
            row_sum: row_out.as_mut(),
            col_sum: col_out.as_mut(),
        };
        match info.kind {
            ElementKind::Int32 => project_typed::<i32>(&mut src, outputs, &mut stats),
            ElementKind::Float32 => project_typed::<f32>(&mut src, outputs, &mut stats),
            ElementKind::Float64 => project_typed::<f64>(&mut src, outputs, &mut stats),
        }
        .with_code(ErrorCode::ProjectFailed)?;

        if let Some(out) = row_out {
            out.close().with_code(ErrorCode::ProjectFailed)?;
            stats.row_sum_written = true;
        }
        if let Some(out) = col_out {
            out.close().with_code(ErrorCode::ProjectFailed)?;
            stats.col_sum_written = true;
        }
        Ok(stats)
    }
}

struct Outputs<'a> {
    row_sum: Option<&'a mut MatrixHandle>,
    col_sum: Option<&'a mut MatrixHandle>,
}

fn create_output(
    path: &Path,
    info: MatrixInfo,
    format_code: ErrorCode,
    open_code: ErrorCode,
) -> Result<MatrixHandle> {
    info.validate().with_code(format_code)?;
    MatrixHandle::create(path, info).with_code(open_code)
}

fn project_typed<T: Element>(
    src: &mut MatrixHandle,
    mut outputs: Outputs<'_>,
    stats: &mut ProjectStats,
) -> Result<()> {
    let info = *src.info();
    let mut line_buf = vec![T::default(); info.columns as usize];
    let mut row_sum = vec![T::default(); info.columns as usize];
    let mut col_sum = vec![T::default(); info.lines as usize];

    for level in 0..info.levels {
        row_sum.fill(T::default());
        for line in 0..info.lines {
            src.read_line(&mut line_buf, level, line)?;
            stats.lines_read += 1;

            let mut line_total = T::default();
            for (acc, &v) in row_sum.iter_mut().zip(&line_buf) {
                *acc = acc.accumulate(v);
                line_total = line_total.accumulate(v);
            }
            col_sum[line as usize] = line_total;
            stats.total += line_buf.iter().map(|v| v.to_f64()).sum::<f64>();
        }

        if let Some(out) = outputs.row_sum.as_deref_mut() {
            out.write_line(&row_sum, level, 0)?;
        }
        if let Some(out) = outputs.col_sum.as_deref_mut() {
            out.write_line(&col_sum, level, 0)?;
        }
    }
    Ok(())
}
