//! Human-readable renderings of convolution results.

use std::collections::BTreeSet;

use dyaa_core::{ErrorInfo, GenError};
use serde::{Deserialize, Serialize};

use crate::accumulator::{ConvolutionOptions, GridAccumulator};
use crate::bin::BinLimits;
use crate::grid::NtupleGrid;
use crate::lumi::LumiEntry;
use crate::order::Order;

/// Formats `value` in printf-style scientific notation (`5.294e-01`).
///
/// Unlike Rust's `{:e}`, the exponent always carries a sign and at least two
/// digits.
pub fn scientific(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let formatted = format!("{:.*e}", precision, value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => formatted,
    }
}

/// One output line per bin: `"{lo:.1f} {hi:.1f} {xsec:.3e}"`.
pub fn format_bin_line(lo: f64, hi: f64, xsec: f64) -> String {
    format!("{:.1} {:.1} {}", lo, hi, scientific(xsec, 3))
}

/// Renders every bin of a convolution result.
pub fn bin_lines(limits: &BinLimits, values: &[f64]) -> Result<Vec<String>, GenError> {
    check_len(limits, values.len())?;
    Ok(limits
        .left()
        .iter()
        .zip(limits.right())
        .zip(values)
        .map(|((&lo, &hi), &xsec)| format_bin_line(lo, hi, xsec))
        .collect())
}

/// Renders the luminosity channels of a grid, one line per channel.
pub fn lumi_lines(channels: &[LumiEntry]) -> Vec<String> {
    channels
        .iter()
        .enumerate()
        .map(|(index, channel)| format!("{index} {channel}"))
        .collect()
}

/// Per-bin comparison of two convolution results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinComparison {
    /// Bin index.
    pub bin: usize,
    /// Lower bin edge.
    pub left: f64,
    /// Upper bin edge.
    pub right: f64,
    /// Value of the first result.
    pub lhs: f64,
    /// Value of the second result.
    pub rhs: f64,
    /// `lhs / rhs - 1`, exactly zero when both values are equal.
    pub rel_diff: f64,
}

impl BinComparison {
    /// Renders the comparison like the bin lines, followed by the relative difference.
    pub fn line(&self) -> String {
        format!(
            "{:.1} {:.1} {} {} {}",
            self.left,
            self.right,
            scientific(self.lhs, 7),
            scientific(self.rhs, 7),
            scientific(self.rel_diff, 3)
        )
    }
}

/// Compares two convolution results over the same binning.
pub fn compare(limits: &BinLimits, lhs: &[f64], rhs: &[f64]) -> Result<Vec<BinComparison>, GenError> {
    check_len(limits, lhs.len())?;
    check_len(limits, rhs.len())?;
    Ok(lhs
        .iter()
        .zip(rhs)
        .enumerate()
        .map(|(bin, (&lhs, &rhs))| BinComparison {
            bin,
            left: limits.left()[bin],
            right: limits.right()[bin],
            lhs,
            rhs,
            rel_diff: if lhs == rhs { 0.0 } else { lhs / rhs - 1.0 },
        })
        .collect())
}

/// Difference of two grids, order by order.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDiff {
    /// Central orders found only in the first grid.
    pub only_lhs: Vec<Order>,
    /// Central orders found only in the second grid.
    pub only_rhs: Vec<Order>,
    /// Bin-by-bin comparison for every central order both grids share, ascending.
    pub orders: Vec<(Order, Vec<BinComparison>)>,
}

impl GridDiff {
    /// Renders the order mismatches, if any, followed by one table per shared order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.only_lhs.is_empty() || !self.only_rhs.is_empty() {
            lines.push(order_list("---", &self.only_lhs));
            lines.push(order_list("+++", &self.only_rhs));
        }
        for (order, rows) in &self.orders {
            lines.push(order.to_string());
            lines.extend(rows.iter().map(BinComparison::line));
        }
        lines
    }
}

fn order_list(marker: &str, orders: &[Order]) -> String {
    let names: Vec<String> = orders.iter().map(Order::to_string).collect();
    format!("{marker} Orders: {}", names.join(" "))
}

fn central_orders(grid: &NtupleGrid) -> BTreeSet<Order> {
    grid.orders()
        .iter()
        .copied()
        .filter(Order::is_central)
        .collect()
}

fn convolute_order(
    grid: &NtupleGrid,
    order: &Order,
    xfx: &dyn Fn(i32, f64, f64) -> f64,
    alphas: &dyn Fn(f64) -> f64,
) -> Result<Vec<f64>, GenError> {
    let mask = grid.orders().iter().map(|candidate| candidate == order).collect();
    grid.convolute(xfx, xfx, alphas, &ConvolutionOptions::with_order_mask(mask))
}

/// Compares two grids with the same binning over their shared central orders.
///
/// Both grids are convoluted with the same PDF and coupling, one order at a
/// time. Grids with different bin limits are an error.
pub fn diff_grids(
    lhs: &NtupleGrid,
    rhs: &NtupleGrid,
    xfx: &dyn Fn(i32, f64, f64) -> f64,
    alphas: &dyn Fn(f64) -> f64,
) -> Result<GridDiff, GenError> {
    if lhs.bin_limits() != rhs.bin_limits() {
        let render = |limits: &BinLimits| {
            limits
                .limits()
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        };
        return Err(GenError::Grid(
            ErrorInfo::new("bin-limits-mismatch", "grids with different bin limits cannot be compared")
                .with_context("lhs", render(lhs.bin_limits()))
                .with_context("rhs", render(rhs.bin_limits())),
        ));
    }

    let lhs_orders = central_orders(lhs);
    let rhs_orders = central_orders(rhs);
    let mut orders = Vec::new();
    for order in lhs_orders.intersection(&rhs_orders) {
        let rows = compare(
            lhs.bin_limits(),
            &convolute_order(lhs, order, xfx, alphas)?,
            &convolute_order(rhs, order, xfx, alphas)?,
        )?;
        orders.push((*order, rows));
    }

    Ok(GridDiff {
        only_lhs: lhs_orders.difference(&rhs_orders).copied().collect(),
        only_rhs: rhs_orders.difference(&lhs_orders).copied().collect(),
        orders,
    })
}

fn check_len(limits: &BinLimits, len: usize) -> Result<(), GenError> {
    if len != limits.bins() {
        return Err(GenError::Grid(
            ErrorInfo::new("bin-mismatch", "result length differs from the number of bins")
                .with_context("bins", limits.bins().to_string())
                .with_context("values", len.to_string()),
        ));
    }
    Ok(())
}
