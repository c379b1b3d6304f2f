use std::path::Path;

use dyaa_core::{ErrorInfo, GenError, RunProvenance};
use serde::{Deserialize, Serialize};

use crate::accumulator::{ConvolutionOptions, GridAccumulator, MergeableGrid, Ntuple};
use crate::bin::BinLimits;
use crate::lumi::LumiEntry;
use crate::order::Order;
use crate::persist;

/// Events collected for one (order, bin, channel) slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    entries: Vec<Ntuple>,
}

impl GridCell {
    /// Stored events in fill order.
    pub fn entries(&self) -> &[Ntuple] {
        &self.entries
    }

    /// Accumulated weight of the cell.
    pub fn weight(&self) -> f64 {
        self.entries.iter().map(|entry| entry.weight).sum()
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no event was stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Grid storing every accepted event as an n-tuple.
///
/// Convolution is exact: each stored event is weighted with the PDFs at its own
/// `(x1, x2, q2)`, no interpolation is involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NtupleGrid {
    lumi: Vec<LumiEntry>,
    orders: Vec<Order>,
    bin_limits: BinLimits,
    cells: Vec<GridCell>,
    provenance: RunProvenance,
}

impl NtupleGrid {
    /// Creates an empty grid with the given layout.
    pub fn new(
        lumi: Vec<LumiEntry>,
        orders: Vec<Order>,
        bin_limits: BinLimits,
    ) -> Result<Self, GenError> {
        if lumi.is_empty() {
            return Err(GenError::config(
                "lumi-empty",
                "a grid needs at least one luminosity channel",
            ));
        }
        if orders.is_empty() {
            return Err(GenError::config(
                "orders-empty",
                "a grid needs at least one perturbative order",
            ));
        }
        let cells = vec![GridCell::default(); orders.len() * bin_limits.bins() * lumi.len()];
        Ok(Self {
            lumi,
            orders,
            bin_limits,
            cells,
            provenance: RunProvenance::default(),
        })
    }

    pub(crate) fn from_parts(
        lumi: Vec<LumiEntry>,
        orders: Vec<Order>,
        bin_limits: BinLimits,
        cells: Vec<GridCell>,
        provenance: RunProvenance,
    ) -> Result<Self, GenError> {
        let mut grid = Self::new(lumi, orders, bin_limits)?;
        if cells.len() != grid.cells.len() {
            return Err(GenError::Serde(
                ErrorInfo::new("cell-count", "stored cells do not match the grid layout")
                    .with_context("expected", grid.cells.len().to_string())
                    .with_context("found", cells.len().to_string()),
            ));
        }
        grid.cells = cells;
        grid.provenance = provenance;
        Ok(grid)
    }

    pub(crate) fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    fn cell_index(&self, order: usize, bin: usize, channel: usize) -> usize {
        (order * self.bin_limits.bins() + bin) * self.lumi.len() + channel
    }

    /// The cell addressed by order, channel and bin, if it exists.
    pub fn cell(&self, order: usize, channel: usize, bin: usize) -> Option<&GridCell> {
        if order >= self.orders.len() || channel >= self.lumi.len() || bin >= self.bin_limits.bins()
        {
            return None;
        }
        self.cells.get(self.cell_index(order, bin, channel))
    }

    /// Accumulated weight of one cell.
    pub fn cell_weight(&self, order: usize, channel: usize, bin: usize) -> Option<f64> {
        self.cell(order, channel, bin).map(GridCell::weight)
    }

    /// Sum of the weights of all cells.
    pub fn total_weight(&self) -> f64 {
        self.cells.iter().map(GridCell::weight).sum()
    }

    /// Number of stored events across all cells.
    pub fn entries(&self) -> usize {
        self.cells.iter().map(GridCell::len).sum()
    }

    /// Provenance attached to the grid.
    pub fn provenance(&self) -> &RunProvenance {
        &self.provenance
    }

    /// Replaces the provenance attached to the grid.
    pub fn set_provenance(&mut self, provenance: RunProvenance) {
        self.provenance = provenance;
    }

    /// Multiplies every stored weight by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for cell in &mut self.cells {
            for entry in &mut cell.entries {
                entry.weight *= factor;
            }
        }
    }

    /// Scales each order by `global * alphas^k * alpha^l * logxir^m * logxif^n`,
    /// where the exponents are the order's powers.
    pub fn scale_by_order(&mut self, alphas: f64, alpha: f64, logxir: f64, logxif: f64, global: f64) {
        let bins = self.bin_limits.bins();
        let channels = self.lumi.len();
        for (index, order) in self.orders.iter().enumerate() {
            let factor = global
                * alphas.powi(order.alphas as i32)
                * alpha.powi(order.alpha as i32)
                * logxir.powi(order.logxir as i32)
                * logxif.powi(order.logxif as i32);
            let start = index * bins * channels;
            for cell in &mut self.cells[start..start + bins * channels] {
                for entry in &mut cell.entries {
                    entry.weight *= factor;
                }
            }
        }
    }

    /// Reads a grid written by [`GridAccumulator::write`].
    pub fn read(path: &Path) -> Result<Self, GenError> {
        persist::read(path)
    }

    fn same_layout(&self, other: &Self) -> bool {
        self.lumi == other.lumi && self.orders == other.orders && self.bin_limits == other.bin_limits
    }
}

impl GridAccumulator for NtupleGrid {
    fn orders(&self) -> &[Order] {
        &self.orders
    }

    fn channels(&self) -> &[LumiEntry] {
        &self.lumi
    }

    fn bin_limits(&self) -> &BinLimits {
        &self.bin_limits
    }

    fn fill(
        &mut self,
        order: usize,
        observable: f64,
        channel: usize,
        ntuple: &Ntuple,
    ) -> Result<(), GenError> {
        self.check_layout(order, channel)?;
        if !ntuple.weight.is_finite() {
            return Err(GenError::Grid(
                ErrorInfo::new("weight-finite", "refusing to store a non-finite weight")
                    .with_context("observable", observable.to_string()),
            ));
        }
        if let Some(bin) = self.bin_limits.index(observable) {
            let index = self.cell_index(order, bin, channel);
            self.cells[index].entries.push(*ntuple);
        }
        Ok(())
    }

    fn convolute(
        &self,
        xfx1: &dyn Fn(i32, f64, f64) -> f64,
        xfx2: &dyn Fn(i32, f64, f64) -> f64,
        alphas: &dyn Fn(f64) -> f64,
        options: &ConvolutionOptions,
    ) -> Result<Vec<f64>, GenError> {
        let bins = self.bin_limits.bins();
        let bin_indices: Vec<usize> = if options.bin_indices.is_empty() {
            (0..bins).collect()
        } else {
            options.bin_indices.clone()
        };
        if let Some(&bin) = bin_indices.iter().find(|&&bin| bin >= bins) {
            return Err(GenError::Grid(
                ErrorInfo::new("bin-index", "requested bin outside the grid")
                    .with_context("bin", bin.to_string())
                    .with_context("bins", bins.to_string()),
            ));
        }
        let scales = options.scales();
        let widths = self.bin_limits.widths();

        let mut results = Vec::with_capacity(bin_indices.len() * scales.len());
        for &bin in &bin_indices {
            for &(xir, xif) in &scales {
                let mut value = 0.0;
                for (order_index, order) in self.orders.iter().enumerate() {
                    if !ConvolutionOptions::selects(&options.order_mask, order_index) {
                        continue;
                    }
                    let log_factor = (xir * xir).ln().powi(order.logxir as i32)
                        * (xif * xif).ln().powi(order.logxif as i32);
                    if log_factor == 0.0 {
                        continue;
                    }
                    for (channel, entry) in self.lumi.iter().enumerate() {
                        if !ConvolutionOptions::selects(&options.lumi_mask, channel) {
                            continue;
                        }
                        let cell = &self.cells[self.cell_index(order_index, bin, channel)];
                        for ntuple in &cell.entries {
                            let mur2 = xir * xir * ntuple.q2;
                            let muf2 = xif * xif * ntuple.q2;
                            let lumi = entry.evaluate(xfx1, xfx2, ntuple.x1, ntuple.x2, muf2);
                            value += ntuple.weight
                                * alphas(mur2).powi(order.alphas as i32)
                                * lumi
                                * log_factor;
                        }
                    }
                }
                results.push(value / widths[bin]);
            }
        }
        Ok(results)
    }

    fn write(&self, path: &Path) -> Result<(), GenError> {
        persist::write(self, path)
    }
}

impl MergeableGrid for NtupleGrid {
    fn empty_like(&self) -> Self {
        Self {
            lumi: self.lumi.clone(),
            orders: self.orders.clone(),
            bin_limits: self.bin_limits.clone(),
            cells: vec![GridCell::default(); self.cells.len()],
            provenance: self.provenance.clone(),
        }
    }

    fn merge(&mut self, other: Self) -> Result<(), GenError> {
        if !self.same_layout(&other) {
            return Err(GenError::Grid(
                ErrorInfo::new("layout-mismatch", "grids with different layouts cannot be merged")
                    .with_hint("merge only grids created from the same layout"),
            ));
        }
        for (cell, other_cell) in self.cells.iter_mut().zip(other.cells) {
            cell.entries.extend(other_cell.entries);
        }
        Ok(())
    }
}
