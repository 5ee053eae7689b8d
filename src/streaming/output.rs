//! Efficient text output for matrix dumps and spectra.
//!
//! Uses itoa for integer formatting and ryu for float formatting
//! to avoid allocation in the hot path.

use crate::error::MatrixError;
use crate::matrix::{Element, ElementKind};
use crate::streaming::buffers::TEXT_OUTPUT_BUFFER;
use std::io::{BufWriter, Write};

/// Tab-separated text writer.
pub struct TextWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    ryu_buf: ryu::Buffer,
}

impl<W: Write> TextWriter<W> {
    /// Create a new TextWriter with the default 2MB buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(TEXT_OUTPUT_BUFFER, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            ryu_buf: ryu::Buffer::new(),
        }
    }

    #[inline]
    pub fn write_int<I: itoa::Integer>(&mut self, n: I) -> Result<(), MatrixError> {
        self.writer.write_all(self.itoa_buf.format(n).as_bytes())?;
        Ok(())
    }

    #[inline]
    pub fn write_float(&mut self, f: f64) -> Result<(), MatrixError> {
        self.writer.write_all(self.ryu_buf.format(f).as_bytes())?;
        Ok(())
    }

    /// Write one element in the shortest form for its kind.
    #[inline]
    pub fn write_value<T: Element>(&mut self, v: T) -> Result<(), MatrixError> {
        match T::KIND {
            ElementKind::Int32 => self.write_int(v.to_i32()),
            ElementKind::Float32 => {
                let f = v.to_f64() as f32;
                self.writer.write_all(self.ryu_buf.format(f).as_bytes())?;
                Ok(())
            }
            ElementKind::Float64 => self.write_float(v.to_f64()),
        }
    }

    /// Write values separated by tabs, followed by a newline.
    pub fn write_row<T: Element>(&mut self, row: &[T]) -> Result<(), MatrixError> {
        for (i, &v) in row.iter().enumerate() {
            if i > 0 {
                self.write_tab()?;
            }
            self.write_value(v)?;
        }
        self.write_newline()
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), MatrixError> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    #[inline]
    pub fn write_tab(&mut self) -> Result<(), MatrixError> {
        self.writer.write_all(b"\t")?;
        Ok(())
    }

    #[inline]
    pub fn write_newline(&mut self) -> Result<(), MatrixError> {
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), MatrixError> {
        self.writer.flush()?;
        Ok(())
    }
}
