//! Re-encode a matrix into another storage variant or element kind.
//!
//! Lines are copied in increasing order, which every storage variant
//! accepts. With `transpose` set, the destination lines are the source
//! columns, read through a [`ColumnCache`] so each band of columns costs one
//! pass over the source.

use super::Destination;
use crate::config;
use crate::error::{ErrorCode, MatrixError, Result, WithCode};
use crate::matrix::{ColumnCache, Element, ElementKind, MatrixHandle, StorageVariant};
use std::path::Path;

/// Convert command configuration.
#[derive(Debug, Clone, Default)]
pub struct ConvertCommand {
    /// Destination storage variant (default: the configured variant)
    pub variant: Option<StorageVariant>,
    /// Destination element kind (default: the source kind)
    pub kind: Option<ElementKind>,
    /// Write the transpose of the source
    pub transpose: bool,
}

/// Statistics from a conversion.
#[derive(Debug, Default, Clone)]
pub struct ConvertStats {
    pub lines_written: u64,
    /// Uncompressed size of the data.
    pub raw_bytes: u64,
    /// Size of the destination file.
    pub file_bytes: u64,
    pub band_refills: u64,
}

impl ConvertStats {
    /// Destination file size relative to the uncompressed data.
    pub fn ratio(&self) -> f64 {
        if self.raw_bytes == 0 {
            1.0
        } else {
            self.file_bytes as f64 / self.raw_bytes as f64
        }
    }
}

impl std::fmt::Display for ConvertStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lines written={}, data={} bytes, file={} bytes ({:.1}%)",
            self.lines_written,
            self.raw_bytes,
            self.file_bytes,
            self.ratio() * 100.0
        )?;
        if self.band_refills > 0 {
            write!(f, ", band refills={}", self.band_refills)?;
        }
        Ok(())
    }
}

impl ConvertCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variant(mut self, variant: StorageVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_transpose(mut self, transpose: bool) -> Self {
        self.transpose = transpose;
        self
    }

    /// Convert `src` into `dst`. `dst` may name `src` itself.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, src: P, dst: Q) -> Result<ConvertStats> {
        let failed = if self.transpose {
            ErrorCode::TransposeFailed
        } else {
            ErrorCode::Unknown
        };

        let mut source = MatrixHandle::open(src.as_ref()).with_code(ErrorCode::SourceOpen)?;
        let src_info = *source.info();
        let shape = if self.transpose {
            src_info.transposed()
        } else {
            src_info
        };
        let kind = self.kind.unwrap_or(src_info.kind);
        let variant = config::output_variant(self.variant, kind, src_info.variant);
        let info = shape.with_kind(kind).with_variant(variant);
        info.validate().with_code(ErrorCode::DestinationFormat)?;

        let dest =
            Destination::new(src.as_ref(), dst.as_ref()).with_code(ErrorCode::DestinationOpen)?;
        let mut target =
            MatrixHandle::create(dest.path(), info).with_code(ErrorCode::DestinationOpen)?;

        let mut stats = ConvertStats {
            raw_bytes: info.data_size(),
            ..Default::default()
        };
        let copy = match info.kind {
            ElementKind::Int32 => self.copy_typed::<i32>(&mut source, &mut target, &mut stats),
            ElementKind::Float32 => self.copy_typed::<f32>(&mut source, &mut target, &mut stats),
            ElementKind::Float64 => self.copy_typed::<f64>(&mut source, &mut target, &mut stats),
        };
        copy.with_code(failed)?;
        target.close().with_code(failed)?;
        drop(source);
        dest.commit().with_code(failed)?;

        stats.file_bytes = std::fs::metadata(dst.as_ref())
            .map(|m| m.len())
            .unwrap_or_default();
        Ok(stats)
    }

    fn copy_typed<T: Element>(
        &self,
        src: &mut MatrixHandle,
        dst: &mut MatrixHandle,
        stats: &mut ConvertStats,
    ) -> Result<()> {
        let info = *dst.info();
        let mut buf = vec![T::default(); info.columns as usize];

        if !self.transpose {
            for level in 0..info.levels {
                for line in 0..info.lines {
                    src.read_line(&mut buf, level, line)?;
                    dst.write_line(&buf, level, line)?;
                    stats.lines_written += 1;
                }
            }
            return Ok(());
        }

        let mut cache = ColumnCache::new();
        for level in 0..info.levels {
            for col in 0..info.lines {
                let got = cache.read_column(src, level, col, &mut buf)?;
                if got != buf.len() {
                    return Err(MatrixError::ShortRead {
                        level,
                        line: col,
                        got,
                        expected: buf.len(),
                    });
                }
                dst.write_line(&buf, level, col)?;
                stats.lines_written += 1;
            }
        }
        stats.band_refills = cache.refills();
        Ok(())
    }
}
