//! One-dimensional result of a cut.

use crate::error::Result;
use crate::streaming::TextWriter;
use std::io::Write;

/// A binned 1-D spectrum over `[min, max)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub name: String,
    pub title: String,
    pub min: f64,
    pub max: f64,
    pub counts: Vec<f64>,
}

impl Spectrum {
    pub fn new(name: &str, title: &str, min: f64, max: f64, counts: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            min,
            max,
            counts,
        }
    }

    #[inline]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        if self.counts.is_empty() {
            0.0
        } else {
            (self.max - self.min) / self.counts.len() as f64
        }
    }

    /// Centre of `bin` in axis units.
    pub fn center(&self, bin: usize) -> f64 {
        self.min + (bin as f64 + 0.5) * self.bin_width()
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Write `centre<TAB>count` lines, preceded by a `#` header line.
    pub fn write_text<W: Write>(&self, output: W) -> Result<()> {
        let mut writer = TextWriter::new(output);
        writer.write_bytes(b"# ")?;
        writer.write_bytes(self.name.as_bytes())?;
        if !self.title.is_empty() {
            writer.write_tab()?;
            writer.write_bytes(self.title.as_bytes())?;
        }
        writer.write_newline()?;

        for (bin, &count) in self.counts.iter().enumerate() {
            writer.write_float(self.center(bin))?;
            writer.write_tab()?;
            writer.write_float(count)?;
            writer.write_newline()?;
        }
        writer.flush()
    }
}
