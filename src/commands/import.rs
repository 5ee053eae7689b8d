//! Build a matrix from whitespace-separated text.
//!
//! Each non-blank text line is one matrix line; values are separated by
//! tabs or spaces. One or more blank lines end a level. Lines starting with
//! `#` are ignored. Every line must have the same number of values and
//! every level the same number of lines.
//!
//! The text is scanned twice: once to find the shape, which the matrix
//! header needs before the first line is written, and once to parse and
//! write the values.

use crate::config;
use crate::error::{ErrorCode, MatrixError, Result, WithCode};
use crate::matrix::{Element, ElementKind, MatrixHandle, MatrixInfo, StorageVariant};
use crate::streaming::{fields, is_blank, is_comment, Lines};
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Import command configuration.
#[derive(Debug, Clone)]
pub struct ImportCommand {
    /// Element kind of the new matrix
    pub kind: ElementKind,
    /// Storage variant of the new matrix (default: the configured variant)
    pub variant: Option<StorageVariant>,
}

impl Default for ImportCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics from an import.
#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    pub levels: u32,
    pub lines: u32,
    pub columns: u32,
    pub values: u64,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} level(s) of {}x{}, {} values",
            self.levels, self.lines, self.columns, self.values
        )
    }
}

impl ImportCommand {
    pub fn new() -> Self {
        Self {
            kind: ElementKind::Int32,
            variant: None,
        }
    }

    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_variant(mut self, variant: StorageVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Import a text file.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, dst: Q) -> Result<ImportStats> {
        let path = input.as_ref();
        let file = File::open(path)
            .map_err(|source| MatrixError::Open {
                path: path.to_path_buf(),
                source,
            })
            .with_code(ErrorCode::SourceOpen)?;
        if file.metadata()?.len() == 0 {
            return self.run_bytes(&[], dst);
        }
        // SAFETY: the input is only read, and not expected to change while
        // the import runs.
        let map = unsafe { Mmap::map(&file)? };
        self.run_bytes(&map, dst)
    }

    /// Import text read from `reader` (stdin, say).
    pub fn run_reader<R: Read, Q: AsRef<Path>>(
        &self,
        mut reader: R,
        dst: Q,
    ) -> Result<ImportStats> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.run_bytes(&data, dst)
    }

    pub fn run_bytes<Q: AsRef<Path>>(&self, data: &[u8], dst: Q) -> Result<ImportStats> {
        let shape = scan_shape(data).with_code(ErrorCode::SourceOpen)?;
        let info = MatrixInfo::new(shape.levels, shape.lines, shape.columns)
            .with_kind(self.kind)
            .with_variant(config::output_variant(
                self.variant,
                self.kind,
                StorageVariant::Raw,
            ));
        info.validate().with_code(ErrorCode::DestinationFormat)?;
        let mut handle = MatrixHandle::create(dst, info).with_code(ErrorCode::DestinationOpen)?;

        match self.kind {
            ElementKind::Int32 => write_values::<i32>(data, &mut handle),
            ElementKind::Float32 => write_values::<f32>(data, &mut handle),
            ElementKind::Float64 => write_values::<f64>(data, &mut handle),
        }?;
        handle.close()?;

        Ok(ImportStats {
            levels: shape.levels,
            lines: shape.lines,
            columns: shape.columns,
            values: info.element_count(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shape {
    levels: u32,
    lines: u32,
    columns: u32,
}

fn scan_shape(data: &[u8]) -> Result<Shape> {
    let mut levels = 0u32;
    let mut level_lines: Option<u32> = None;
    let mut lines = 0u32;
    let mut columns: Option<u32> = None;

    let mut end_level = |lines: &mut u32, levels: &mut u32| -> Result<()> {
        if *lines == 0 {
            return Ok(());
        }
        match level_lines {
            Some(n) if n != *lines => {
                return Err(MatrixError::Format(format!(
                    "level {} has {} lines, expected {}",
                    *levels, *lines, n
                )))
            }
            _ => level_lines = Some(*lines),
        }
        *levels += 1;
        *lines = 0;
        Ok(())
    };

    let mut iter = Lines::new(data);
    while let Some(line) = iter.next() {
        if is_comment(line) {
            continue;
        }
        if is_blank(line) {
            end_level(&mut lines, &mut levels)?;
            continue;
        }
        let n = fields(line).count() as u32;
        match columns {
            Some(c) if c != n => {
                return Err(MatrixError::Format(format!(
                    "line {}: {} values, expected {}",
                    iter.line_number(),
                    n,
                    c
                )))
            }
            _ => columns = Some(n),
        }
        lines += 1;
    }
    end_level(&mut lines, &mut levels)?;

    match (level_lines, columns) {
        (Some(lines), Some(columns)) => Ok(Shape {
            levels,
            lines,
            columns,
        }),
        _ => Err(MatrixError::Format("no matrix lines in input".to_string())),
    }
}

fn write_values<T: Element>(data: &[u8], handle: &mut MatrixHandle) -> Result<()> {
    let info = *handle.info();
    let mut row = vec![T::default(); info.columns as usize];
    let mut level = 0u32;
    let mut line = 0u32;

    let mut iter = Lines::new(data);
    while let Some(text) = iter.next() {
        if is_comment(text) {
            continue;
        }
        if is_blank(text) {
            if line > 0 {
                level += 1;
                line = 0;
            }
            continue;
        }
        for (v, field) in row.iter_mut().zip(fields(text)) {
            *v = parse_value(field).ok_or_else(|| {
                MatrixError::Format(format!(
                    "line {}: invalid {} value '{}'",
                    iter.line_number(),
                    info.kind,
                    String::from_utf8_lossy(field)
                ))
            })?;
        }
        handle.write_line(&row, level, line)?;
        line += 1;
    }
    Ok(())
}

#[inline]
fn parse_value<T: Element>(field: &[u8]) -> Option<T> {
    std::str::from_utf8(field).ok()?.parse::<T>().ok()
}
