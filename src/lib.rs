// Clippy allows for the whole crate
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]

//! ggmat: gamma-gamma matrix toolkit
//!
//! This library stores very large two-dimensional count matrices in a
//! compact line-compressed file format and runs whole-matrix operations on
//! them with bounded memory.
//!
//! # Features
//!
//! - **Line codec**: two generations of a lossless delta/run-length integer
//!   codec, one line per compressed record
//! - **Bounded memory**: projection and transposition never hold more than
//!   a fixed working set, regardless of matrix size
//! - **Cuts**: background-subtracted spectra from file or memory backed
//!   matrices
//!
//! # Example
//!
//! ```rust,no_run
//! use ggmat::commands::{ProjectCommand, TransposeCommand};
//! use std::path::Path;
//!
//! // Transpose a matrix, then project it onto both axes
//! TransposeCommand::new().run("gg.ggm", "gg_t.ggm").unwrap();
//! let stats = ProjectCommand::new()
//!     .run("gg_t.ggm", Some(Path::new("x.ggm")), Some(Path::new("y.ggm")))
//!     .unwrap();
//! println!("{}", stats);
//! ```

pub mod codec;
pub mod commands;
pub mod config;
pub mod cut;
pub mod error;
pub mod matrix;
pub mod streaming;

// Re-export commonly used types
pub use codec::{DecodeError, LineCodec};
pub use error::{ErrorCode, MatrixError, Result};
pub use matrix::{ElementKind, MatrixHandle, MatrixInfo, StorageVariant};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point reporting a stable result code: project `src` onto its
/// row-sum and column-sum matrices. An empty output path skips that output.
pub fn project(src: &str, row_sum: &str, col_sum: &str) -> ErrorCode {
    let rows = (!row_sum.is_empty()).then(|| std::path::Path::new(row_sum));
    let cols = (!col_sum.is_empty()).then(|| std::path::Path::new(col_sum));
    match commands::ProjectCommand::new().run(src, rows, cols) {
        Ok(_) => ErrorCode::Success,
        Err(e) => e.code(),
    }
}

/// Entry point reporting a stable result code: transpose `src` into `dst`.
pub fn transpose(src: &str, dst: &str) -> ErrorCode {
    match commands::TransposeCommand::new().run(src, dst) {
        Ok(_) => ErrorCode::Success,
        Err(e) => e.code(),
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{
        ConvertCommand, CutCommand, DumpCommand, GenerateCommand, ImportCommand, InfoCommand,
        ProjectCommand, TransposeCommand,
    };
    pub use crate::cut::{CutAxis, CutEngine, DenseMatrix, Spectrum, VirtualMatrix};
    pub use crate::error::{ErrorCode, MatrixError};
    pub use crate::matrix::{
        ColumnCache, Element, ElementKind, MatrixHandle, MatrixInfo, StorageVariant,
    };
}
