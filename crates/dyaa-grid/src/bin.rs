use dyaa_core::{ErrorInfo, GenError};
use serde::{Deserialize, Serialize};

/// Strictly ascending bin boundaries over a one-dimensional observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinLimits {
    limits: Vec<f64>,
}

impl BinLimits {
    /// Validates and wraps the given limits.
    ///
    /// At least two finite limits are required and every limit must be strictly
    /// larger than its predecessor.
    pub fn new(limits: Vec<f64>) -> Result<Self, GenError> {
        if limits.len() < 2 {
            return Err(GenError::Config(
                ErrorInfo::new("bin-count", "at least two bin limits are required")
                    .with_context("limits", limits.len().to_string()),
            ));
        }
        if let Some(index) = limits.iter().position(|limit| !limit.is_finite()) {
            return Err(GenError::Config(
                ErrorInfo::new("bin-finite", "bin limits must be finite")
                    .with_context("index", index.to_string()),
            ));
        }
        if let Some(index) = limits.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(GenError::Config(
                ErrorInfo::new("bin-order", "bin limits must be strictly ascending")
                    .with_context("index", (index + 1).to_string())
                    .with_context("previous", limits[index].to_string())
                    .with_context("value", limits[index + 1].to_string()),
            ));
        }
        Ok(Self { limits })
    }

    /// `bins` equally wide bins covering `[lo, hi]`.
    pub fn uniform(lo: f64, hi: f64, bins: usize) -> Result<Self, GenError> {
        if bins == 0 {
            return Err(GenError::config("bin-count", "at least one bin is required"));
        }
        let step = (hi - lo) / bins as f64;
        Self::new((0..=bins).map(|i| lo + step * i as f64).collect())
    }

    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.limits.len() - 1
    }

    /// All limits, including both outer edges.
    pub fn limits(&self) -> &[f64] {
        &self.limits
    }

    /// Lower edge of every bin.
    pub fn left(&self) -> &[f64] {
        &self.limits[..self.limits.len() - 1]
    }

    /// Upper edge of every bin.
    pub fn right(&self) -> &[f64] {
        &self.limits[1..]
    }

    /// Width of every bin; used to turn bin integrals into differential values.
    pub fn widths(&self) -> Vec<f64> {
        self.limits.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    /// Bin containing `value`, using half-open `[lo, hi)` bins.
    pub fn index(&self, value: f64) -> Option<usize> {
        let first = self.limits[0];
        let last = self.limits[self.limits.len() - 1];
        if value.is_nan() || value < first || value >= last {
            return None;
        }
        Some(self.limits.partition_point(|&limit| limit <= value) - 1)
    }
}
