//! Matrix sources the cut engine can sum lines from.
//!
//! A [`VirtualMatrix`] is either file backed (one line read at a time from a
//! [`MatrixHandle`]) or memory backed (a borrowed [`DenseMatrix`]). Either
//! can be cut along its lines or its columns.

use crate::error::{MatrixError, Result};
use crate::matrix::{ColumnCache, Element, MatrixHandle};

/// Which axis the cut regions select along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutAxis {
    /// Regions select lines; the spectrum runs along the columns.
    #[default]
    Lines,
    /// Regions select columns; the spectrum runs along the lines.
    Columns,
}

impl CutAxis {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lines" | "line" | "y" => Some(CutAxis::Lines),
            "columns" | "column" | "x" => Some(CutAxis::Columns),
            _ => None,
        }
    }
}

/// Uniform binning of one matrix axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinAxis {
    pub bins: u32,
    pub min: f64,
    pub max: f64,
}

impl BinAxis {
    pub fn new(bins: u32, min: f64, max: f64) -> Self {
        Self { bins, min, max }
    }

    /// Axis whose bin `i` is centred on channel `i`.
    pub fn channels(bins: u32) -> Self {
        Self::new(bins, -0.5, f64::from(bins) - 0.5)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        if self.bins == 0 {
            1.0
        } else {
            (self.max - self.min) / f64::from(self.bins)
        }
    }

    /// Bin containing `x`. May lie outside `0..bins`.
    #[inline]
    pub fn find_bin(&self, x: f64) -> i32 {
        let bin = ((x - self.min) / self.width()).floor();
        bin.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
    }

    #[inline]
    pub fn center(&self, bin: i32) -> f64 {
        self.min + (f64::from(bin) + 0.5) * self.width()
    }
}

/// A materialised matrix level held in memory as `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    lines: u32,
    columns: u32,
    /// Line-major.
    data: Vec<f64>,
    /// Binning of the columns.
    x_axis: BinAxis,
    /// Binning of the lines.
    y_axis: BinAxis,
}

impl DenseMatrix {
    pub fn new(lines: u32, columns: u32) -> Self {
        Self {
            lines,
            columns,
            data: vec![0.0; lines as usize * columns as usize],
            x_axis: BinAxis::channels(columns),
            y_axis: BinAxis::channels(lines),
        }
    }

    /// Build from equally sized rows.
    pub fn from_rows<T: Element>(rows: &[Vec<T>]) -> Result<Self> {
        let columns = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != columns) {
            return Err(MatrixError::Format(
                "rows of a dense matrix must have equal length".to_string(),
            ));
        }
        let mut m = Self::new(rows.len() as u32, columns as u32);
        for (dst, &v) in m.data.iter_mut().zip(rows.iter().flatten()) {
            *dst = v.to_f64();
        }
        Ok(m)
    }

    /// Load one level of an open matrix.
    pub fn from_handle(handle: &mut MatrixHandle, level: u32) -> Result<Self> {
        let info = *handle.info();
        if level >= info.levels {
            return Err(MatrixError::OutOfRange {
                level,
                line: 0,
                column: 0,
            });
        }
        let mut m = Self::new(info.lines, info.columns);
        if info.columns > 0 {
            for (line, row) in m.data.chunks_exact_mut(info.columns as usize).enumerate() {
                handle.read_line(row, level, line as u32)?;
            }
        }
        Ok(m)
    }

    /// Replace the column (x) and line (y) binning.
    pub fn with_axes(mut self, x_axis: BinAxis, y_axis: BinAxis) -> Self {
        self.x_axis = x_axis;
        self.y_axis = y_axis;
        self
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn x_axis(&self) -> &BinAxis {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &BinAxis {
        &self.y_axis
    }

    #[inline]
    pub fn get(&self, line: u32, col: u32) -> f64 {
        self.data[line as usize * self.columns as usize + col as usize]
    }

    #[inline]
    pub fn set(&mut self, line: u32, col: u32, v: f64) {
        self.data[line as usize * self.columns as usize + col as usize] = v;
    }

    pub fn row(&self, line: u32) -> &[f64] {
        let start = line as usize * self.columns as usize;
        &self.data[start..start + self.columns as usize]
    }

    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }
}

/// File-backed source reading one level of an open matrix.
#[derive(Debug)]
pub struct FileMatrix<'a> {
    handle: &'a mut MatrixHandle,
    level: u32,
    axis: CutAxis,
    cache: ColumnCache,
    scratch: Vec<f64>,
}

/// Memory-backed source over a borrowed dense matrix.
#[derive(Debug, Clone, Copy)]
pub struct MemoryMatrix<'a> {
    data: &'a DenseMatrix,
    axis: CutAxis,
}

/// The closed set of sources a cut can run over.
#[derive(Debug)]
pub enum VirtualMatrix<'a> {
    File(FileMatrix<'a>),
    Memory(MemoryMatrix<'a>),
}

impl<'a> VirtualMatrix<'a> {
    /// Cut `level` of an open matrix.
    pub fn file(handle: &'a mut MatrixHandle, level: u32, axis: CutAxis) -> Result<Self> {
        let info = *handle.info();
        if level >= info.levels {
            return Err(MatrixError::OutOfRange {
                level,
                line: 0,
                column: 0,
            });
        }
        let width = match axis {
            CutAxis::Lines => info.columns,
            CutAxis::Columns => info.lines,
        };
        Ok(VirtualMatrix::File(FileMatrix {
            handle,
            level,
            axis,
            cache: ColumnCache::new(),
            scratch: vec![0.0; width as usize],
        }))
    }

    pub fn memory(data: &'a DenseMatrix, axis: CutAxis) -> Self {
        VirtualMatrix::Memory(MemoryMatrix { data, axis })
    }

    pub fn axis(&self) -> CutAxis {
        match self {
            VirtualMatrix::File(m) => m.axis,
            VirtualMatrix::Memory(m) => m.axis,
        }
    }

    /// Binning along the cut axis and along the projected axis.
    fn axes(&self) -> (BinAxis, BinAxis) {
        let (x, y) = match self {
            VirtualMatrix::File(m) => {
                let info = m.handle.info();
                (BinAxis::channels(info.columns), BinAxis::channels(info.lines))
            }
            VirtualMatrix::Memory(m) => (m.data.x_axis, m.data.y_axis),
        };
        match self.axis() {
            CutAxis::Lines => (y, x),
            CutAxis::Columns => (x, y),
        }
    }

    /// Bin along the cut axis holding coordinate `x`.
    pub fn find_cut_bin(&self, x: f64) -> i32 {
        self.axes().0.find_bin(x)
    }

    pub fn cut_low_bin(&self) -> i32 {
        0
    }

    pub fn cut_high_bin(&self) -> i32 {
        self.axes().0.bins as i32 - 1
    }

    pub fn proj_min(&self) -> f64 {
        self.axes().1.min
    }

    pub fn proj_max(&self) -> f64 {
        self.axes().1.max
    }

    pub fn proj_bins(&self) -> i32 {
        self.axes().1.bins as i32
    }

    /// Add line `index` along the cut axis into `acc`, elementwise.
    pub fn add_line(&mut self, acc: &mut [f64], index: i32) -> Result<()> {
        match self {
            VirtualMatrix::File(m) => m.add_line(acc, index),
            VirtualMatrix::Memory(m) => m.add_line(acc, index),
        }
    }
}

impl FileMatrix<'_> {
    fn add_line(&mut self, acc: &mut [f64], index: i32) -> Result<()> {
        let info = *self.handle.info();
        let Ok(index) = u32::try_from(index) else {
            return Err(out_of_range(self.level, index));
        };
        match self.axis {
            CutAxis::Lines => {
                self.handle.read_line(&mut self.scratch, self.level, index)?;
            }
            CutAxis::Columns => {
                let got = self
                    .cache
                    .read_column(self.handle, self.level, index, &mut self.scratch)?;
                if got != info.lines as usize {
                    return Err(MatrixError::ShortRead {
                        level: self.level,
                        line: index,
                        got,
                        expected: info.lines as usize,
                    });
                }
            }
        }
        for (a, v) in acc.iter_mut().zip(&self.scratch) {
            *a += v;
        }
        Ok(())
    }
}

impl MemoryMatrix<'_> {
    fn add_line(&self, acc: &mut [f64], index: i32) -> Result<()> {
        let m = self.data;
        let limit = match self.axis {
            CutAxis::Lines => m.lines,
            CutAxis::Columns => m.columns,
        };
        let index = match u32::try_from(index) {
            Ok(i) if i < limit => i,
            _ => return Err(out_of_range(0, index)),
        };
        match self.axis {
            CutAxis::Lines => {
                for (a, v) in acc.iter_mut().zip(m.row(index)) {
                    *a += v;
                }
            }
            CutAxis::Columns => {
                for (line, a) in acc.iter_mut().enumerate().take(m.lines as usize) {
                    *a += m.get(line as u32, index);
                }
            }
        }
        Ok(())
    }
}

fn out_of_range(level: u32, index: i32) -> MatrixError {
    MatrixError::OutOfRange {
        level,
        line: index.max(0) as u32,
        column: 0,
    }
}
