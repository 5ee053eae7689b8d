//! Command implementations for ggmat.

pub mod convert;
pub mod cut;
pub mod dump;
pub mod generate;
pub mod import;
pub mod info;
pub mod project;
pub mod transpose;

use crate::error::{MatrixError, Result};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

pub use convert::{ConvertCommand, ConvertStats};
pub use cut::{CutCommand, RegionSpec};
pub use dump::{DumpCommand, DumpStats};
pub use generate::{GenerateCommand, GenerateConfig, GenerateStats};
pub use import::{ImportCommand, ImportStats};
pub use info::{InfoCommand, MatrixSummary};
pub use project::{ProjectCommand, ProjectStats, MAX_PROJECT_LEVELS};
pub use transpose::{transpose_handles, TransposeCommand, TransposeStats};

/// Where a command writes its destination matrix.
///
/// A destination that is the source file itself is written to a temporary
/// file in the same directory, which replaces the source on commit.
pub(crate) struct Destination {
    target: PathBuf,
    staged: Option<TempPath>,
}

impl Destination {
    pub(crate) fn new(src: &Path, dst: &Path) -> Result<Self> {
        let same = match (src.canonicalize(), dst.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        let staged = if same {
            let dir = dst
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let temp = tempfile::Builder::new()
                .prefix(".ggmat-")
                .tempfile_in(dir)?;
            Some(temp.into_temp_path())
        } else {
            None
        };
        Ok(Self {
            target: dst.to_path_buf(),
            staged,
        })
    }

    /// Path to create the destination matrix at.
    pub(crate) fn path(&self) -> &Path {
        self.staged.as_deref().unwrap_or(self.target.as_path())
    }

    /// Move a staged destination into place.
    pub(crate) fn commit(self) -> Result<()> {
        if let Some(staged) = self.staged {
            staged
                .persist(&self.target)
                .map_err(|e| MatrixError::Io(e.error))?;
        }
        Ok(())
    }
}
