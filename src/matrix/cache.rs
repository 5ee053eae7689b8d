//! Column band cache for column-major access to row-major matrices.
//!
//! Reading a single column from line-oriented storage touches every line.
//! The cache instead reads a contiguous band of columns across all lines in
//! one pass, so consecutive column requests are served from memory until
//! one falls outside the band or moves to another level.

use super::{Element, MatrixHandle};
use crate::error::{MatrixError, Result};
use crate::streaming::buffers::COLUMN_BAND_BUDGET;
use rustc_hash::FxHashMap;

/// One cached band: columns `first..first + width` of every line of `level`.
#[derive(Debug)]
struct Band {
    level: u32,
    first: u32,
    width: u32,
    /// Line-major: `data[line * width + (col - first)]`.
    data: Vec<f64>,
}

impl Band {
    #[inline]
    fn contains(&self, level: u32, col: u32) -> bool {
        self.level == level && col >= self.first && col - self.first < self.width
    }
}

/// Column band cache keyed by handle id.
#[derive(Debug)]
pub struct ColumnCache {
    bands: FxHashMap<u64, Band>,
    budget: usize,
    refills: u64,
}

impl Default for ColumnCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnCache {
    pub fn new() -> Self {
        Self::with_budget(COLUMN_BAND_BUDGET)
    }

    /// Cache whose bands hold at most `budget` bytes each.
    pub fn with_budget(budget: usize) -> Self {
        Self {
            bands: FxHashMap::default(),
            budget,
            refills: 0,
        }
    }

    /// Number of band refills so far.
    pub fn refills(&self) -> u64 {
        self.refills
    }

    /// Width of the band used for `handle`.
    pub fn band_width(&self, handle: &MatrixHandle) -> u32 {
        let info = handle.info();
        let per_column = std::mem::size_of::<f64>() * (info.lines.max(1) as usize);
        let width = (self.budget / per_column).max(1);
        (width.min(info.columns as usize)) as u32
    }

    /// Drop the band held for `handle`.
    pub fn invalidate(&mut self, handle: &MatrixHandle) {
        self.bands.remove(&handle.id());
    }

    pub fn clear(&mut self) {
        self.bands.clear();
    }

    /// Read one element through the cache.
    pub fn get<T: Element>(
        &mut self,
        handle: &mut MatrixHandle,
        level: u32,
        line: u32,
        col: u32,
    ) -> Result<T> {
        if line >= handle.info().lines {
            return Err(MatrixError::OutOfRange {
                level,
                line,
                column: col,
            });
        }
        let band = self.band(handle, level, col)?;
        let at = line as usize * band.width as usize + (col - band.first) as usize;
        Ok(T::from_f64(band.data[at]))
    }

    /// Read column `col` of every line into `out`.
    ///
    /// Returns the number of elements read, 0 if the column is outside the
    /// matrix.
    pub fn read_column<T: Element>(
        &mut self,
        handle: &mut MatrixHandle,
        level: u32,
        col: u32,
        out: &mut [T],
    ) -> Result<usize> {
        let info = *handle.info();
        if level >= info.levels || col >= info.columns {
            return Ok(0);
        }
        let band = self.band(handle, level, col)?;
        let offset = (col - band.first) as usize;
        let n = out.len().min(info.lines as usize);
        for (line, v) in out[..n].iter_mut().enumerate() {
            *v = T::from_f64(band.data[line * band.width as usize + offset]);
        }
        Ok(n)
    }

    fn band(&mut self, handle: &mut MatrixHandle, level: u32, col: u32) -> Result<&Band> {
        let info = *handle.info();
        if level >= info.levels || col >= info.columns {
            return Err(MatrixError::OutOfRange {
                level,
                line: 0,
                column: col,
            });
        }

        let id = handle.id();
        let hit = self
            .bands
            .get(&id)
            .is_some_and(|band| band.contains(level, col));
        if !hit {
            let width = self.band_width(handle).min(info.columns - col);
            let band = self.fill(handle, level, col, width)?;
            self.bands.insert(id, band);
            self.refills += 1;
        }

        self.bands.get(&id).ok_or(MatrixError::OutOfRange {
            level,
            line: 0,
            column: col,
        })
    }

    fn fill(
        &mut self,
        handle: &mut MatrixHandle,
        level: u32,
        first: u32,
        width: u32,
    ) -> Result<Band> {
        let lines = handle.info().lines;
        // Reuse the evicted band's allocation when there is one.
        let mut data = self
            .bands
            .remove(&handle.id())
            .map(|band| band.data)
            .unwrap_or_default();
        data.clear();
        data.resize(lines as usize * width as usize, 0.0);

        for (line, chunk) in data.chunks_exact_mut(width as usize).enumerate() {
            let got = handle.get(chunk, level, line as u32, first)?;
            if got != width as usize {
                return Err(MatrixError::ShortRead {
                    level,
                    line: line as u32,
                    got,
                    expected: width as usize,
                });
            }
        }

        Ok(Band {
            level,
            first,
            width,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{MatrixInfo, StorageVariant};
    use tempfile::tempdir;

    fn write_matrix(path: &std::path::Path, levels: u32, lines: u32, columns: u32) {
        let info =
            MatrixInfo::new(levels, lines, columns).with_variant(StorageVariant::LineCompressedV2);
        let mut h = MatrixHandle::create(path, info).unwrap();
        for level in 0..levels {
            for l in 0..lines {
                let row: Vec<i32> = (0..columns)
                    .map(|c| (level * 1000 + l * 100 + c) as i32)
                    .collect();
                h.write_line(&row, level, l).unwrap();
            }
        }
        h.close().unwrap();
    }

    #[test]
    fn test_column_reads_match_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.lc");
        write_matrix(&path, 2, 5, 7);
        let mut h = MatrixHandle::open(&path).unwrap();
        // Room for two columns of five f64 values.
        let mut cache = ColumnCache::with_budget(2 * 5 * 8);
        assert_eq!(cache.band_width(&h), 2);

        let mut column = [0i32; 5];
        for col in 0..7 {
            assert_eq!(cache.read_column(&mut h, 1, col, &mut column).unwrap(), 5);
            let expected: Vec<i32> = (0..5).map(|l| 1000 + l * 100 + col as i32).collect();
            assert_eq!(column.to_vec(), expected);
        }
        // Bands start at 0, 2, 4, 6.
        assert_eq!(cache.refills(), 4);
    }

    #[test]
    fn test_level_change_refills() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.lc");
        write_matrix(&path, 2, 3, 4);
        let mut h = MatrixHandle::open(&path).unwrap();
        let mut cache = ColumnCache::new();

        assert_eq!(cache.get::<i32>(&mut h, 0, 1, 0).unwrap(), 100);
        assert_eq!(cache.get::<i32>(&mut h, 0, 2, 3).unwrap(), 203);
        assert_eq!(cache.refills(), 1);
        assert_eq!(cache.get::<i32>(&mut h, 1, 1, 0).unwrap(), 1100);
        assert_eq!(cache.refills(), 2);
    }

    #[test]
    fn test_out_of_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.lc");
        write_matrix(&path, 1, 2, 2);
        let mut h = MatrixHandle::open(&path).unwrap();
        let mut cache = ColumnCache::new();
        let mut column = [0f64; 2];
        assert_eq!(cache.read_column(&mut h, 0, 2, &mut column).unwrap(), 0);
        assert!(cache.get::<f64>(&mut h, 0, 2, 0).is_err());
        assert!(cache.get::<f64>(&mut h, 1, 0, 0).is_err());
    }

    #[test]
    fn test_bands_are_per_handle() {
        let dir = tempdir().unwrap();
        let a_path = dir.path().join("a.lc");
        let b_path = dir.path().join("b.lc");
        write_matrix(&a_path, 1, 2, 3);
        write_matrix(&b_path, 2, 2, 3);
        let mut a = MatrixHandle::open(&a_path).unwrap();
        let mut b = MatrixHandle::open(&b_path).unwrap();
        let mut cache = ColumnCache::new();

        assert_eq!(cache.get::<i32>(&mut a, 0, 1, 1).unwrap(), 101);
        assert_eq!(cache.get::<i32>(&mut b, 1, 1, 1).unwrap(), 1101);
        assert_eq!(cache.get::<i32>(&mut a, 0, 0, 2).unwrap(), 2);
        assert_eq!(cache.refills(), 2);

        cache.invalidate(&a);
        assert_eq!(cache.get::<i32>(&mut a, 0, 0, 2).unwrap(), 2);
        assert_eq!(cache.refills(), 3);
    }
}
