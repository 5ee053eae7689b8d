//! Header summary of a matrix file.

use crate::error::{ErrorCode, MatrixError, Result, WithCode};
use crate::matrix::{MatrixHandle, MatrixInfo};
use std::path::{Path, PathBuf};

/// Info command configuration.
#[derive(Debug, Clone, Default)]
pub struct InfoCommand {
    /// Also sum every level (reads the whole matrix)
    pub totals: bool,
}

/// What `info` reports about one matrix.
#[derive(Debug, Clone)]
pub struct MatrixSummary {
    pub path: PathBuf,
    pub info: MatrixInfo,
    pub file_bytes: u64,
    /// Total size of the stored lines, for compressed files.
    pub compressed_bytes: Option<u64>,
    pub level_totals: Option<Vec<f64>>,
}

impl MatrixSummary {
    /// Stored line data relative to the uncompressed size.
    pub fn compression_ratio(&self) -> Option<f64> {
        let stored = self.compressed_bytes?;
        let raw = self.info.data_size();
        Some(if raw == 0 { 1.0 } else { stored as f64 / raw as f64 })
    }
}

impl std::fmt::Display for MatrixSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "file:     {}", self.path.display())?;
        writeln!(f, "format:   {}", self.info.variant)?;
        writeln!(f, "kind:     {}", self.info.kind)?;
        writeln!(f, "levels:   {}", self.info.levels)?;
        writeln!(f, "lines:    {}", self.info.lines)?;
        writeln!(f, "columns:  {}", self.info.columns)?;
        write!(f, "size:     {} bytes", self.file_bytes)?;
        if let (Some(stored), Some(ratio)) = (self.compressed_bytes, self.compression_ratio()) {
            write!(
                f,
                "\nstored:   {} of {} bytes ({:.1}%)",
                stored,
                self.info.data_size(),
                ratio * 100.0
            )?;
        }
        if let Some(totals) = &self.level_totals {
            for (level, total) in totals.iter().enumerate() {
                write!(f, "\ntotal[{}]: {}", level, total)?;
            }
        }
        Ok(())
    }
}

impl InfoCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_totals(mut self, totals: bool) -> Self {
        self.totals = totals;
        self
    }

    pub fn run<P: AsRef<Path>>(&self, src: P) -> Result<MatrixSummary> {
        let path = src.as_ref();
        let mut handle = MatrixHandle::open(path).with_code(ErrorCode::SourceOpen)?;
        let info = *handle.info();
        let file_bytes = std::fs::metadata(path)
            .map(|m| m.len())
            .map_err(MatrixError::Io)
            .with_code(ErrorCode::SourceOpen)?;

        let level_totals = if self.totals {
            let mut totals = Vec::with_capacity(info.levels as usize);
            let mut buf = vec![0.0f64; info.columns as usize];
            for level in 0..info.levels {
                let mut total = 0.0;
                for line in 0..info.lines {
                    handle.read_line(&mut buf, level, line)?;
                    total += buf.iter().sum::<f64>();
                }
                totals.push(total);
            }
            Some(totals)
        } else {
            None
        };

        Ok(MatrixSummary {
            path: path.to_path_buf(),
            info,
            file_bytes,
            compressed_bytes: handle.compressed_bytes(),
            level_totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::StorageVariant;
    use tempfile::tempdir;

    #[test]
    fn test_summary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.ggm");
        let mut h = MatrixHandle::create(&path, MatrixInfo::new(2, 2, 8)).unwrap();
        h.write_line(&[0i32; 8], 0, 0).unwrap();
        h.write_line(&[1i32; 8], 0, 1).unwrap();
        h.write_line(&[2i32; 8], 1, 0).unwrap();
        h.close().unwrap();

        let summary = InfoCommand::new().with_totals(true).run(&path).unwrap();
        assert_eq!(summary.info.variant, StorageVariant::LineCompressedV2);
        assert_eq!(summary.level_totals, Some(vec![8.0, 16.0]));
        assert!(summary.compression_ratio().unwrap() < 0.5);

        let text = summary.to_string();
        assert!(text.contains("levels:   2"));
        assert!(text.contains("total[1]: 16"));
    }

    #[test]
    fn test_raw_has_no_ratio() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.ggm");
        let info = MatrixInfo::new(1, 1, 1).with_variant(StorageVariant::Raw);
        MatrixHandle::create(&path, info).unwrap().close().unwrap();
        let summary = InfoCommand::new().run(&path).unwrap();
        assert!(summary.compression_ratio().is_none());
        assert_eq!(summary.file_bytes, 36);
    }
}
