//! Matrix shape and encoding description.

use crate::codec::LineCodec;
use crate::error::MatrixError;
use std::fmt;

/// Numeric kind of the stored elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int32,
    Float32,
    Float64,
}

impl ElementKind {
    /// Size of one stored element in bytes.
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            ElementKind::Int32 | ElementKind::Float32 => 4,
            ElementKind::Float64 => 8,
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "int" | "i32" | "int32" => Some(ElementKind::Int32),
            "float" | "f32" | "float32" => Some(ElementKind::Float32),
            "double" | "f64" | "float64" => Some(ElementKind::Float64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Int32 => "int",
            ElementKind::Float32 => "float",
            ElementKind::Float64 => "double",
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        match self {
            ElementKind::Int32 => 0,
            ElementKind::Float32 => 1,
            ElementKind::Float64 => 2,
        }
    }

    pub(crate) fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(ElementKind::Int32),
            1 => Some(ElementKind::Float32),
            2 => Some(ElementKind::Float64),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// On-disk layout of the matrix data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageVariant {
    /// Uncompressed, random access, any element kind.
    Raw,
    /// Line compressed with the first codec generation.
    LineCompressedV1,
    /// Line compressed with the run-length codec generation.
    LineCompressedV2,
}

impl StorageVariant {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "raw" => Some(StorageVariant::Raw),
            "lc1" | "lcv1" => Some(StorageVariant::LineCompressedV1),
            "lc" | "lc2" | "lcv2" => Some(StorageVariant::LineCompressedV2),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StorageVariant::Raw => "raw",
            StorageVariant::LineCompressedV1 => "lc1",
            StorageVariant::LineCompressedV2 => "lc2",
        }
    }

    /// Codec generation used by compressed variants.
    #[inline]
    pub fn codec(self) -> Option<LineCodec> {
        match self {
            StorageVariant::Raw => None,
            StorageVariant::LineCompressedV1 => Some(LineCodec::V1),
            StorageVariant::LineCompressedV2 => Some(LineCodec::V2),
        }
    }

    /// Compressed variants only store 32-bit integers.
    #[inline]
    pub fn supports(self, kind: ElementKind) -> bool {
        self == StorageVariant::Raw || kind == ElementKind::Int32
    }

    pub(crate) fn to_byte(self) -> u8 {
        match self {
            StorageVariant::Raw => 0,
            StorageVariant::LineCompressedV1 => 1,
            StorageVariant::LineCompressedV2 => 2,
        }
    }

    pub(crate) fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(StorageVariant::Raw),
            1 => Some(StorageVariant::LineCompressedV1),
            2 => Some(StorageVariant::LineCompressedV2),
            _ => None,
        }
    }
}

impl fmt::Display for StorageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape and encoding of a matrix file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixInfo {
    pub levels: u32,
    pub lines: u32,
    pub columns: u32,
    pub kind: ElementKind,
    pub variant: StorageVariant,
}

impl MatrixInfo {
    pub fn new(levels: u32, lines: u32, columns: u32) -> Self {
        Self {
            levels,
            lines,
            columns,
            kind: ElementKind::Int32,
            variant: StorageVariant::LineCompressedV2,
        }
    }

    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_variant(mut self, variant: StorageVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Same matrix with lines and columns swapped.
    pub fn transposed(self) -> Self {
        Self {
            lines: self.columns,
            columns: self.lines,
            ..self
        }
    }

    /// Number of lines over all levels.
    #[inline]
    pub fn line_count(&self) -> u64 {
        u64::from(self.levels) * u64::from(self.lines)
    }

    /// Number of elements over all levels.
    #[inline]
    pub fn element_count(&self) -> u64 {
        self.line_count() * u64::from(self.columns)
    }

    /// Uncompressed size of the data in bytes.
    #[inline]
    pub fn data_size(&self) -> u64 {
        self.element_count() * self.kind.size() as u64
    }

    /// Index of `(level, line)` in level-major order.
    #[inline]
    pub(crate) fn line_index(&self, level: u32, line: u32) -> usize {
        (u64::from(level) * u64::from(self.lines) + u64::from(line)) as usize
    }

    pub fn validate(&self) -> Result<(), MatrixError> {
        if !self.variant.supports(self.kind) {
            return Err(MatrixError::Format(format!(
                "{} storage cannot hold {} elements",
                self.variant, self.kind
            )));
        }
        let bytes = u128::from(self.levels)
            * u128::from(self.lines)
            * u128::from(self.columns)
            * self.kind.size() as u128;
        if bytes > u128::from(u64::MAX) {
            return Err(MatrixError::Format(format!(
                "matrix of {}x{}x{} is too large",
                self.levels, self.lines, self.columns
            )));
        }
        Ok(())
    }
}

impl fmt::Display for MatrixInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "levels: {}, lines: {}, columns: {}, kind: {}, format: {}",
            self.levels, self.lines, self.columns, self.kind, self.variant
        )
    }
}
