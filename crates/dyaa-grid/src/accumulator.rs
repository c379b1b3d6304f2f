//! The contract between the event generator and grid storage.
//!
//! The generator only ever calls [`GridAccumulator::fill`]; convolution and
//! persistence are exposed for the caller that owns the grid afterwards.

use std::path::Path;

use dyaa_core::{ErrorInfo, GenError};
use serde::{Deserialize, Serialize};

use crate::bin::BinLimits;
use crate::lumi::LumiEntry;
use crate::order::Order;

/// A single weighted event as stored in a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ntuple {
    /// Momentum fraction of the first parton.
    pub x1: f64,
    /// Momentum fraction of the second parton.
    pub x2: f64,
    /// Factorization and renormalization scale squared in GeV^2.
    pub q2: f64,
    /// Event weight in picobarn.
    pub weight: f64,
}

impl Ntuple {
    /// Creates a new n-tuple.
    pub const fn new(x1: f64, x2: f64, q2: f64, weight: f64) -> Self {
        Self { x1, x2, q2, weight }
    }
}

/// Selection and scale variations applied by [`GridAccumulator::convolute`].
///
/// Empty masks select everything; an empty `xi` list means the central scale
/// `(1.0, 1.0)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvolutionOptions {
    /// Which orders contribute, indexed like the grid's orders.
    pub order_mask: Vec<bool>,
    /// Bins to evaluate, in output order.
    pub bin_indices: Vec<usize>,
    /// Which luminosity channels contribute.
    pub lumi_mask: Vec<bool>,
    /// `(xi_R, xi_F)` scale factors; one output value per bin and pair.
    pub xi: Vec<(f64, f64)>,
}

impl ConvolutionOptions {
    /// Options restricted to the orders whose mask entry is set.
    pub fn with_order_mask(order_mask: Vec<bool>) -> Self {
        Self {
            order_mask,
            ..Self::default()
        }
    }

    pub(crate) fn selects(mask: &[bool], index: usize) -> bool {
        mask.is_empty() || mask.get(index).copied().unwrap_or(false)
    }

    pub(crate) fn scales(&self) -> Vec<(f64, f64)> {
        if self.xi.is_empty() {
            vec![(1.0, 1.0)]
        } else {
            self.xi.clone()
        }
    }
}

/// Binned, order- and channel-resolved weight storage.
pub trait GridAccumulator {
    /// Perturbative orders stored in the grid.
    fn orders(&self) -> &[Order];

    /// Partonic luminosity channels stored in the grid.
    fn channels(&self) -> &[LumiEntry];

    /// Binning of the observable.
    fn bin_limits(&self) -> &BinLimits;

    /// Adds `ntuple.weight` to the cell selected by order, channel and the bin
    /// containing `observable`. Observables outside the binning are dropped.
    fn fill(
        &mut self,
        order: usize,
        observable: f64,
        channel: usize,
        ntuple: &Ntuple,
    ) -> Result<(), GenError>;

    /// Convolutes the grid with two PDFs and the strong coupling, returning
    /// differential cross sections bin-major, one value per scale pair.
    fn convolute(
        &self,
        xfx1: &dyn Fn(i32, f64, f64) -> f64,
        xfx2: &dyn Fn(i32, f64, f64) -> f64,
        alphas: &dyn Fn(f64) -> f64,
        options: &ConvolutionOptions,
    ) -> Result<Vec<f64>, GenError>;

    /// Persists the accumulated state.
    fn write(&self, path: &Path) -> Result<(), GenError>;

    /// Checks that `order` and `channel` address existing grid slices.
    fn check_layout(&self, order: usize, channel: usize) -> Result<(), GenError> {
        if order >= self.orders().len() {
            return Err(GenError::Config(
                ErrorInfo::new("order-index", "order index outside the grid layout")
                    .with_context("order", order.to_string())
                    .with_context("orders", self.orders().len().to_string()),
            ));
        }
        if channel >= self.channels().len() {
            return Err(GenError::Config(
                ErrorInfo::new("channel-index", "channel index outside the grid layout")
                    .with_context("channel", channel.to_string())
                    .with_context("channels", self.channels().len().to_string()),
            ));
        }
        Ok(())
    }
}

/// Grids that can be split across workers and recombined.
///
/// `merge` must be per-cell addition so that recombining partial grids in a
/// fixed order reproduces the same state regardless of worker scheduling.
pub trait MergeableGrid: GridAccumulator + Send + Sized {
    /// An empty grid with the same layout.
    fn empty_like(&self) -> Self;

    /// Adds every cell of `other` into `self`.
    fn merge(&mut self, other: Self) -> Result<(), GenError>;
}
