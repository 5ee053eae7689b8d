//! Write a matrix as tab-separated text.
//!
//! Output starts with a `#` comment line describing the shape, followed by
//! one text line per matrix line. Levels are separated by a blank line, so
//! the output can be read back with `import`.

use crate::error::{ErrorCode, MatrixError, Result, WithCode};
use crate::matrix::{Element, ElementKind, MatrixHandle};
use crate::streaming::TextWriter;
use std::io::Write;
use std::path::Path;

/// Dump command configuration.
#[derive(Debug, Clone, Default)]
pub struct DumpCommand {
    /// Dump only this level
    pub level: Option<u32>,
    /// Omit the `#` shape line
    pub no_header: bool,
}

/// Statistics from a dump.
#[derive(Debug, Default, Clone)]
pub struct DumpStats {
    pub levels: u32,
    pub lines: u64,
    pub values: u64,
}

impl std::fmt::Display for DumpStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "levels={}, lines={}, values={}",
            self.levels, self.lines, self.values
        )
    }
}

impl DumpCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn run<P: AsRef<Path>, W: Write>(&self, src: P, output: W) -> Result<DumpStats> {
        let mut handle = MatrixHandle::open(src).with_code(ErrorCode::SourceOpen)?;
        let info = *handle.info();
        let levels = match self.level {
            Some(level) if level >= info.levels => {
                return Err(MatrixError::OutOfRange {
                    level,
                    line: 0,
                    column: 0,
                })
            }
            Some(level) => level..level + 1,
            None => 0..info.levels,
        };

        let mut writer = TextWriter::new(output);
        if !self.no_header {
            writer.write_bytes(b"# ")?;
            writer.write_bytes(info.to_string().as_bytes())?;
            writer.write_newline()?;
        }

        let mut stats = DumpStats::default();
        for level in levels {
            if stats.levels > 0 {
                writer.write_newline()?;
            }
            match info.kind {
                ElementKind::Int32 => {
                    dump_level::<i32, W>(&mut handle, level, &mut writer, &mut stats)?
                }
                ElementKind::Float32 => {
                    dump_level::<f32, W>(&mut handle, level, &mut writer, &mut stats)?
                }
                ElementKind::Float64 => {
                    dump_level::<f64, W>(&mut handle, level, &mut writer, &mut stats)?
                }
            }
            stats.levels += 1;
        }
        writer.flush()?;
        Ok(stats)
    }
}

fn dump_level<T: Element, W: Write>(
    handle: &mut MatrixHandle,
    level: u32,
    writer: &mut TextWriter<W>,
    stats: &mut DumpStats,
) -> Result<()> {
    let info = *handle.info();
    let mut buf = vec![T::default(); info.columns as usize];
    for line in 0..info.lines {
        handle.read_line(&mut buf, level, line)?;
        writer.write_row(&buf)?;
        stats.lines += 1;
        stats.values += buf.len() as u64;
    }
    Ok(())
}
