//! Error types and stable exit codes.

use crate::codec::DecodeError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Stable numeric result codes reported by the matrix operations.
///
/// The numeric values are part of the command-line interface and must not
/// change.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Success = 0,
    Unknown = 1,
    SourceOpen = 2,
    RowSumOpen = 3,
    ColSumOpen = 4,
    DestinationOpen = 5,
    RowSumFormat = 6,
    ColSumFormat = 7,
    DestinationFormat = 8,
    ProjectFailed = 9,
    TransposeFailed = 10,
}

impl ErrorCode {
    const ALL: [ErrorCode; 11] = [
        ErrorCode::Success,
        ErrorCode::Unknown,
        ErrorCode::SourceOpen,
        ErrorCode::RowSumOpen,
        ErrorCode::ColSumOpen,
        ErrorCode::DestinationOpen,
        ErrorCode::RowSumFormat,
        ErrorCode::ColSumFormat,
        ErrorCode::DestinationFormat,
        ErrorCode::ProjectFailed,
        ErrorCode::TransposeFailed,
    ];

    /// Look up a code by number; anything out of range is `Unknown`.
    pub fn from_i32(code: i32) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(ErrorCode::Unknown)
    }

    /// Fixed human-readable message for this code.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Success => "success",
            ErrorCode::Unknown => "unknown error",
            ErrorCode::SourceOpen => "cannot open source matrix",
            ErrorCode::RowSumOpen => "cannot open row-sum projection output",
            ErrorCode::ColSumOpen => "cannot open column-sum projection output",
            ErrorCode::DestinationOpen => "cannot open destination matrix",
            ErrorCode::RowSumFormat => "row-sum projection output format not supported",
            ErrorCode::ColSumFormat => "column-sum projection output format not supported",
            ErrorCode::DestinationFormat => "destination matrix format not supported",
            ErrorCode::ProjectFailed => "projection failed",
            ErrorCode::TransposeFailed => "transposition failed",
        }
    }

    /// Message for a raw numeric code.
    pub fn message_for(code: i32) -> &'static str {
        Self::from_i32(code).message()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Errors that can occur while reading, writing or processing matrices.
#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Invalid matrix format: {0}")]
    Format(String),

    #[error("Corrupt compressed line: {0}")]
    Decode(#[from] DecodeError),

    #[error("Write pattern not supported: {0}")]
    WritePattern(String),

    #[error("handle is not open for {0}")]
    Mode(&'static str),

    #[error("projection supports at most 2 levels, matrix has {levels}")]
    TooManyLevels { levels: u32 },

    #[error("no cut regions defined")]
    NoCutRegions,

    #[error("position out of range: level {level}, line {line}, column {column}")]
    OutOfRange { level: u32, line: u32, column: u32 },

    #[error("short read at level {level}, line {line}: got {got} of {expected} elements")]
    ShortRead {
        level: u32,
        line: u32,
        got: usize,
        expected: usize,
    },

    #[error("short write at level {level}, line {line}: wrote {got} of {expected} elements")]
    ShortWrite {
        level: u32,
        line: u32,
        got: usize,
        expected: usize,
    },

    #[error("{code}: {source}")]
    Operation {
        code: ErrorCode,
        source: Box<MatrixError>,
    },
}

pub type Result<T> = std::result::Result<T, MatrixError>;

impl MatrixError {
    /// Attach a stable result code, keeping the underlying cause.
    ///
    /// An error that already carries a code keeps it.
    pub fn with_code(self, code: ErrorCode) -> Self {
        match self {
            MatrixError::Operation { .. } => self,
            other => MatrixError::Operation {
                code,
                source: Box::new(other),
            },
        }
    }

    /// Stable result code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            MatrixError::Operation { code, .. } => *code,
            _ => ErrorCode::Unknown,
        }
    }
}

/// Helper trait for tagging results with a stable code.
pub trait WithCode<T> {
    fn with_code(self, code: ErrorCode) -> Result<T>;
}

impl<T> WithCode<T> for Result<T> {
    #[inline]
    fn with_code(self, code: ErrorCode) -> Result<T> {
        self.map_err(|e| e.with_code(code))
    }
}
