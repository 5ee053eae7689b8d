//! Background-subtracted cut through one level of a matrix file.
//!
//! Regions are given in calibrated units and mapped to channels with a
//! linear calibration (`channel = offset + gain * value`). By default the
//! file is read one line at a time; `in_memory` loads the level first.

use crate::cut::{CutAxis, CutEngine, CutStats, DenseMatrix, Linear, Spectrum, VirtualMatrix};
use crate::error::{ErrorCode, MatrixError, Result, WithCode};
use crate::matrix::MatrixHandle;
use std::path::Path;
use std::str::FromStr;

/// A region given on the command line as `LOW:HIGH`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSpec {
    pub low: f64,
    pub high: f64,
}

impl FromStr for RegionSpec {
    type Err = MatrixError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || MatrixError::Format(format!("invalid region '{}', expected LOW:HIGH", s));
        let (low, high) = s.split_once(':').ok_or_else(invalid)?;
        let low = low.trim().parse::<f64>().map_err(|_| invalid())?;
        let high = high.trim().parse::<f64>().map_err(|_| invalid())?;
        Ok(Self { low, high })
    }
}

/// Cut command configuration.
#[derive(Debug, Clone)]
pub struct CutCommand {
    pub level: u32,
    pub axis: CutAxis,
    pub cut: Vec<RegionSpec>,
    pub background: Vec<RegionSpec>,
    pub calibration: Linear,
    pub in_memory: bool,
}

impl Default for CutCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CutCommand {
    pub fn new() -> Self {
        Self {
            level: 0,
            axis: CutAxis::Lines,
            cut: Vec::new(),
            background: Vec::new(),
            calibration: Linear {
                offset: 0.0,
                slope: 1.0,
            },
            in_memory: false,
        }
    }

    pub fn with_cut(mut self, low: f64, high: f64) -> Self {
        self.cut.push(RegionSpec { low, high });
        self
    }

    pub fn with_background(mut self, low: f64, high: f64) -> Self {
        self.background.push(RegionSpec { low, high });
        self
    }

    pub fn run<P: AsRef<Path>>(&self, src: P, name: &str) -> Result<(Spectrum, CutStats)> {
        let mut handle = MatrixHandle::open(src).with_code(ErrorCode::SourceOpen)?;
        if self.in_memory {
            let dense = DenseMatrix::from_handle(&mut handle, self.level)?;
            let mut matrix = VirtualMatrix::memory(&dense, self.axis);
            self.cut_matrix(&mut matrix, name)
        } else {
            let mut matrix = VirtualMatrix::file(&mut handle, self.level, self.axis)?;
            self.cut_matrix(&mut matrix, name)
        }
    }

    fn cut_matrix(
        &self,
        matrix: &mut VirtualMatrix<'_>,
        name: &str,
    ) -> Result<(Spectrum, CutStats)> {
        let mut engine = CutEngine::new(matrix);
        for r in &self.cut {
            engine.add_cut_region_with(&self.calibration, r.low, r.high);
        }
        for r in &self.background {
            engine.add_bg_region_with(&self.calibration, r.low, r.high);
        }
        let title = format!("level {} {:?} cut", self.level, self.axis).to_lowercase();
        engine.cut_with_stats(name, &title)
    }
}
