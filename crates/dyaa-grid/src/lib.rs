#![deny(missing_docs)]
#![doc = "Order- and channel-resolved grids: the accumulator contract consumed by the generator and an exact n-tuple implementation with PDF convolution."]

/// Accumulator contract, n-tuples and convolution options.
pub mod accumulator;
/// Validated observable binning.
pub mod bin;
/// N-tuple grid storage, convolution and merging.
pub mod grid;
/// Canonical content hashing for grids.
pub mod hash;
/// Partonic luminosity channels.
pub mod lumi;
/// Perturbative order descriptors.
pub mod order;
/// Binary grid persistence.
pub mod persist;
/// Per-bin text output and comparisons.
pub mod report;

pub use accumulator::{ConvolutionOptions, GridAccumulator, MergeableGrid, Ntuple};
pub use bin::BinLimits;
pub use grid::{GridCell, NtupleGrid};
pub use hash::canonical_hash;
pub use lumi::LumiEntry;
pub use order::Order;
pub use report::{bin_lines, compare, diff_grids, format_bin_line, lumi_lines, BinComparison, GridDiff};
