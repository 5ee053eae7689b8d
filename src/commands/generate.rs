//! Generate synthetic gamma-gamma coincidence matrices.
//!
//! This module provides the `ggmat generate` command to create square,
//! symmetric matrices for benchmarks and tests.
//!
//! Features:
//! - Cascades of gamma transitions; consecutive members coincide and
//!   produce a 2-D Gaussian peak at (E_k, E_k+1) and (E_k+1, E_k)
//! - Flat plus exponentially falling background
//! - Any element kind and storage variant
//! - Deterministic reproducibility via seed

use crate::config;
use crate::error::{ErrorCode, Result, WithCode};
use crate::matrix::{Element, ElementKind, MatrixHandle, MatrixInfo, StorageVariant};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::time::Instant;

/// Configuration for the generate command.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Lines and columns of the square matrix
    pub size: u32,
    pub levels: u32,
    pub kind: ElementKind,
    pub variant: Option<StorageVariant>,
    pub seed: u64,
    /// Transitions per cascade
    pub gammas: usize,
    /// Height of the strongest coincidence peak
    pub peak_height: f64,
    /// Peak width (sigma, channels) at channel 0
    pub sigma: f64,
    /// Flat background per bin
    pub background: f64,
    /// Exponential background height at the origin
    pub exp_background: f64,
    /// Exponential background decay length (channels)
    pub exp_decay: f64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            size: 512,
            levels: 1,
            kind: ElementKind::Int32,
            variant: None,
            seed: 42,
            gammas: 8,
            peak_height: 1000.0,
            sigma: 1.5,
            background: 2.0,
            exp_background: 50.0,
            exp_decay: 200.0,
        }
    }
}

/// Statistics from generate operation.
#[derive(Debug, Default, Clone)]
pub struct GenerateStats {
    pub lines: u64,
    pub peaks: usize,
    pub total: f64,
    pub elapsed_secs: f64,
}

impl std::fmt::Display for GenerateStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} lines, {} peaks, total {:.0} ({:.1}s)",
            self.lines, self.peaks, self.total, self.elapsed_secs
        )
    }
}

/// One coincidence between transitions at `a` and `b`.
#[derive(Debug, Clone)]
struct Peak {
    height: f64,
    /// Unit-height profile of each transition along one axis.
    profile_a: Vec<f64>,
    profile_b: Vec<f64>,
}

pub struct GenerateCommand {
    config: GenerateConfig,
}

impl GenerateCommand {
    pub fn new(config: GenerateConfig) -> Self {
        Self { config }
    }

    pub fn run<P: AsRef<Path>>(&self, dst: P) -> Result<GenerateStats> {
        let start = Instant::now();
        let cfg = &self.config;
        let info = MatrixInfo::new(cfg.levels, cfg.size, cfg.size)
            .with_kind(cfg.kind)
            .with_variant(config::output_variant(
                cfg.variant,
                cfg.kind,
                StorageVariant::Raw,
            ));
        info.validate().with_code(ErrorCode::DestinationFormat)?;
        let mut handle = MatrixHandle::create(dst, info).with_code(ErrorCode::DestinationOpen)?;

        let mut stats = match cfg.kind {
            ElementKind::Int32 => self.generate::<i32>(&mut handle),
            ElementKind::Float32 => self.generate::<f32>(&mut handle),
            ElementKind::Float64 => self.generate::<f64>(&mut handle),
        }?;
        handle.close()?;

        stats.elapsed_secs = start.elapsed().as_secs_f64();
        Ok(stats)
    }

    fn generate<T: Element>(&self, handle: &mut MatrixHandle) -> Result<GenerateStats> {
        let cfg = &self.config;
        let size = cfg.size as usize;
        let mut rng = SmallRng::seed_from_u64(cfg.seed);
        let mut stats = GenerateStats::default();

        let background = self.background_profile();
        let mut values = vec![0.0f64; size];
        let mut row = vec![T::default(); size];

        for level in 0..cfg.levels {
            let peaks = self.cascade(&mut rng);
            stats.peaks += peaks.len();

            for line in 0..size {
                for (col, v) in values.iter_mut().enumerate() {
                    *v = cfg.background + cfg.exp_background * background[line] * background[col];
                }
                for peak in &peaks {
                    let (pa, pb) = (peak.profile_a[line], peak.profile_b[line]);
                    for (col, v) in values.iter_mut().enumerate() {
                        *v += peak.height * (pa * peak.profile_b[col] + pb * peak.profile_a[col]);
                    }
                }

                for (dst, &v) in row.iter_mut().zip(&values) {
                    *dst = T::from_f64(v);
                    stats.total += dst.to_f64();
                }
                handle.write_line(&row, level, line as u32)?;
                stats.lines += 1;
            }
        }
        Ok(stats)
    }

    /// `exp(-x / decay)` per channel; the 2-D background is the outer product.
    fn background_profile(&self) -> Vec<f64> {
        let decay = self.config.exp_decay.max(f64::MIN_POSITIVE);
        (0..self.config.size)
            .map(|x| (-f64::from(x) / decay).exp())
            .collect()
    }

    /// Draw one cascade and its coincidence peaks.
    fn cascade(&self, rng: &mut SmallRng) -> Vec<Peak> {
        let cfg = &self.config;
        let size = f64::from(cfg.size);
        let energies: Vec<f64> = (0..cfg.gammas)
            .map(|_| rng.gen_range(0.05..0.95) * size)
            .collect();

        energies
            .windows(2)
            .map(|pair| {
                let height = cfg.peak_height * rng.gen_range(0.2..1.0);
                Peak {
                    height,
                    profile_a: self.profile(pair[0]),
                    profile_b: self.profile(pair[1]),
                }
            })
            .collect()
    }

    /// Gaussian centred on `energy`, wider at higher channels.
    fn profile(&self, energy: f64) -> Vec<f64> {
        let size = f64::from(self.config.size);
        let sigma = (self.config.sigma * (1.0 + energy / size)).max(f64::MIN_POSITIVE);
        (0..self.config.size)
            .map(|x| {
                let d = (f64::from(x) - energy) / sigma;
                (-0.5 * d * d).exp()
            })
            .collect()
    }
}
