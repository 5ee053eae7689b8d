//! Background-subtracted cuts through a virtual matrix.
//!
//! A cut sums every line selected by the cut regions and subtracts the sum
//! of the lines selected by the background regions, scaled by the ratio of
//! the two line counts:
//!
//! ```text
//! spectrum = sum(cut lines) - (n_cut / n_bg) * sum(background lines)
//! ```
//!
//! With no background regions the scale is 0 and the result is the plain
//! sum of the cut lines.

use super::region::RegionList;
use super::source::VirtualMatrix;
use super::spectrum::Spectrum;
use crate::error::{MatrixError, Result};

/// Maps caller coordinates (energies, say) to the matrix's native axis
/// coordinates before bins are looked up.
pub trait CoordinateMap {
    fn to_native(&self, x: f64) -> f64;
}

/// Coordinates already are native.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl CoordinateMap for Identity {
    #[inline]
    fn to_native(&self, x: f64) -> f64 {
        x
    }
}

/// `native = offset + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    pub offset: f64,
    pub slope: f64,
}

impl CoordinateMap for Linear {
    #[inline]
    fn to_native(&self, x: f64) -> f64 {
        self.offset + self.slope * x
    }
}

impl<F: Fn(f64) -> f64> CoordinateMap for F {
    #[inline]
    fn to_native(&self, x: f64) -> f64 {
        self(x)
    }
}

/// Statistics from one cut.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CutStats {
    pub cut_lines: u64,
    pub bg_lines: u64,
    pub bg_scale: f64,
    pub total: f64,
}

impl std::fmt::Display for CutStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cut lines={}, background lines={}, scale={:.4}, total={}",
            self.cut_lines, self.bg_lines, self.bg_scale, self.total
        )
    }
}

/// Accumulates cut and background regions over a borrowed matrix.
#[derive(Debug)]
pub struct CutEngine<'m, 'a> {
    matrix: &'m mut VirtualMatrix<'a>,
    cut: RegionList,
    bg: RegionList,
}

impl<'m, 'a> CutEngine<'m, 'a> {
    pub fn new(matrix: &'m mut VirtualMatrix<'a>) -> Self {
        Self {
            matrix,
            cut: RegionList::new(),
            bg: RegionList::new(),
        }
    }

    /// Add a cut region between native coordinates `x1` and `x2`.
    ///
    /// Returns false if the region lies outside the matrix.
    pub fn add_cut_region(&mut self, x1: f64, x2: f64) -> bool {
        self.add_cut_region_with(&Identity, x1, x2)
    }

    /// Add a cut region given in coordinates translated by `map`.
    ///
    /// Returns false if the region lies outside the matrix or either bound
    /// maps to a non-finite coordinate.
    pub fn add_cut_region_with<M: CoordinateMap + ?Sized>(
        &mut self,
        map: &M,
        x1: f64,
        x2: f64,
    ) -> bool {
        let (low, high) = (self.matrix.cut_low_bin(), self.matrix.cut_high_bin());
        match self.bins(map, x1, x2) {
            Some((b1, b2)) => self.cut.add(b1, b2, low, high),
            None => false,
        }
    }

    pub fn add_bg_region(&mut self, x1: f64, x2: f64) -> bool {
        self.add_bg_region_with(&Identity, x1, x2)
    }

    pub fn add_bg_region_with<M: CoordinateMap + ?Sized>(
        &mut self,
        map: &M,
        x1: f64,
        x2: f64,
    ) -> bool {
        let (low, high) = (self.matrix.cut_low_bin(), self.matrix.cut_high_bin());
        match self.bins(map, x1, x2) {
            Some((b1, b2)) => self.bg.add(b1, b2, low, high),
            None => false,
        }
    }

    pub fn reset_cut(&mut self) {
        self.cut.clear();
    }

    pub fn reset_bg(&mut self) {
        self.bg.clear();
    }

    pub fn cut_regions(&self) -> &RegionList {
        &self.cut
    }

    pub fn bg_regions(&self) -> &RegionList {
        &self.bg
    }

    /// Compute the background-subtracted spectrum.
    pub fn cut(&mut self, name: &str, title: &str) -> Result<Spectrum> {
        self.cut_with_stats(name, title).map(|(spectrum, _)| spectrum)
    }

    /// Compute the spectrum and report the line counts behind it.
    ///
    /// Any failed line read aborts the cut; no partial spectrum is returned.
    pub fn cut_with_stats(&mut self, name: &str, title: &str) -> Result<(Spectrum, CutStats)> {
        if self.cut.is_empty() {
            return Err(MatrixError::NoCutRegions);
        }

        let bins = self.matrix.proj_bins().max(0) as usize;
        let mut sum = vec![0.0; bins];
        let cut_lines = accumulate(self.matrix, &self.cut, &mut sum)?;
        let mut bg = vec![0.0; bins];
        let bg_lines = accumulate(self.matrix, &self.bg, &mut bg)?;

        let bg_scale = if bg_lines > 0 {
            cut_lines as f64 / bg_lines as f64
        } else {
            0.0
        };
        for (s, b) in sum.iter_mut().zip(&bg) {
            *s -= bg_scale * b;
        }

        let spectrum = Spectrum::new(
            name,
            title,
            self.matrix.proj_min(),
            self.matrix.proj_max(),
            sum,
        );
        let stats = CutStats {
            cut_lines,
            bg_lines,
            bg_scale,
            total: spectrum.total(),
        };
        Ok((spectrum, stats))
    }

    fn bins<M: CoordinateMap + ?Sized>(&self, map: &M, x1: f64, x2: f64) -> Option<(i32, i32)> {
        let (n1, n2) = (map.to_native(x1), map.to_native(x2));
        if !(n1.is_finite() && n2.is_finite()) {
            return None;
        }
        Some((self.matrix.find_cut_bin(n1), self.matrix.find_cut_bin(n2)))
    }
}

/// Add every line covered by `regions` into `acc`. Returns the line count.
fn accumulate(
    matrix: &mut VirtualMatrix<'_>,
    regions: &RegionList,
    acc: &mut [f64],
) -> Result<u64> {
    let mut n = 0;
    for (first, last) in regions.pairs() {
        for line in first..=last {
            matrix.add_line(acc, line)?;
            n += 1;
        }
    }
    Ok(n)
}
