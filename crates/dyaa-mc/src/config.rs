use std::fs;
use std::path::{Path, PathBuf};

use dyaa_core::{ErrorInfo, GenError};
use dyaa_grid::{BinLimits, LumiEntry, Order};
use serde::{Deserialize, Serialize};

use crate::cuts::FiducialCuts;
use crate::filler::{check_calls, ScaleChoice};
use crate::matrix_element::Crossing;
use crate::phase_space::HadronicPhaseSpace;
use crate::workers::check_workers;

/// YAML-configurable parameters of a grid-filling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of Monte Carlo calls.
    #[serde(default = "default_calls")]
    pub calls: u64,
    /// Generated invariant-mass window.
    #[serde(default)]
    pub mass_window: MassWindow,
    /// Scale assigned to each event.
    #[serde(default)]
    pub scale: ScaleChoice,
    /// Order slice receiving the events.
    #[serde(default)]
    pub order_index: usize,
    /// Channel slice receiving the events.
    #[serde(default)]
    pub channel_index: usize,
    /// Fiducial acceptance cuts.
    #[serde(default)]
    pub cuts: FiducialCuts,
    /// Crossing handed to the matrix element.
    #[serde(default)]
    pub crossing: Crossing,
    /// Number of fill threads; `1` runs the loop on the calling thread.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Master seed and label.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,
    /// Layout of the grid being filled.
    #[serde(default)]
    pub grid: GridLayout,
}

fn default_calls() -> u64 {
    100_000
}

fn default_workers() -> usize {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            calls: default_calls(),
            mass_window: MassWindow::default(),
            scale: ScaleChoice::default(),
            order_index: 0,
            channel_index: 0,
            cuts: FiducialCuts::default(),
            crossing: Crossing::default(),
            workers: default_workers(),
            seed_policy: SeedPolicy::default(),
            output: OutputConfig::default(),
            grid: GridLayout::default(),
        }
    }
}

impl RunConfig {
    /// Parses a configuration from YAML; missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, GenError> {
        serde_yaml::from_str(yaml)
            .map_err(|err| GenError::Config(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Reads and parses a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, GenError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            GenError::Io(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            GenError::Config(info) => {
                GenError::Config(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Rejects settings that would fail inside the run.
    pub fn validate(&self) -> Result<(), GenError> {
        check_calls(self.calls)?;
        HadronicPhaseSpace::new(self.mass_window.mmin, self.mass_window.mmax)?;
        check_workers(self.workers)?;
        self.cuts.validate()?;
        if let ScaleChoice::Fixed { q2 } = self.scale {
            if !(q2.is_finite() && q2 > 0.0) {
                return Err(GenError::Config(
                    ErrorInfo::new("scale-q2", "a fixed scale must be positive")
                        .with_context("q2", q2.to_string()),
                ));
            }
        }
        if self.order_index >= self.grid.orders.len() {
            return Err(GenError::Config(
                ErrorInfo::new("order-index", "order index outside the grid layout")
                    .with_context("order", self.order_index.to_string())
                    .with_context("orders", self.grid.orders.len().to_string()),
            ));
        }
        if self.channel_index >= self.grid.channels.len() {
            return Err(GenError::Config(
                ErrorInfo::new("channel-index", "channel index outside the grid layout")
                    .with_context("channel", self.channel_index.to_string())
                    .with_context("channels", self.grid.channels.len().to_string()),
            ));
        }
        BinLimits::new(self.grid.bin_limits.clone())?;
        for channel in &self.grid.channels {
            LumiEntry::new(channel.clone())?;
        }
        Ok(())
    }
}

/// Invariant-mass window of the generated lepton pair, in GeV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassWindow {
    /// Lower edge.
    #[serde(default = "default_mmin")]
    pub mmin: f64,
    /// Upper edge.
    #[serde(default = "default_mmax")]
    pub mmax: f64,
}

fn default_mmin() -> f64 {
    10.0
}

fn default_mmax() -> f64 {
    7000.0
}

impl Default for MassWindow {
    fn default() -> Self {
        Self {
            mmin: default_mmin(),
            mmax: default_mmax(),
        }
    }
}

/// Grid layout: luminosity channels, orders and observable bin limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Each channel as a list of `(pdg_a, pdg_b, factor)`.
    #[serde(default = "default_channels")]
    pub channels: Vec<Vec<(i32, i32, f64)>>,
    /// Orders as `[alphas, alpha, logxir, logxif]`.
    #[serde(default = "default_orders")]
    pub orders: Vec<[u32; 4]>,
    /// Bin limits of `|yll|`.
    #[serde(default = "default_bin_limits")]
    pub bin_limits: Vec<f64>,
}

fn default_channels() -> Vec<Vec<(i32, i32, f64)>> {
    vec![vec![(22, 22, 1.0)]]
}

fn default_orders() -> Vec<[u32; 4]> {
    vec![[0, 2, 0, 0]]
}

fn default_bin_limits() -> Vec<f64> {
    (0..=24).map(|edge| edge as f64 / 10.0).collect()
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            orders: default_orders(),
            bin_limits: default_bin_limits(),
        }
    }
}

impl GridLayout {
    /// Validated channel descriptors.
    pub fn lumi(&self) -> Result<Vec<LumiEntry>, GenError> {
        self.channels
            .iter()
            .map(|channel| LumiEntry::new(channel.clone()))
            .collect()
    }

    /// Order descriptors.
    pub fn orders(&self) -> Vec<Order> {
        self.orders
            .iter()
            .map(|&[alphas, alpha, logxir, logxif]| Order::new(alphas, alpha, logxir, logxif))
            .collect()
    }

    /// Validated bin limits.
    pub fn bin_limits(&self) -> Result<BinLimits, GenError> {
        BinLimits::new(self.bin_limits.clone())
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed used for the run.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in manifests.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Output layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for run artefacts; nothing is written when unset.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Grid filename relative to `run_directory`.
    #[serde(default = "default_grid_filename")]
    pub grid_file: PathBuf,
    /// Manifest filename relative to `run_directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
}

fn default_grid_filename() -> PathBuf {
    PathBuf::from("DY-LO-AA.grid")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            grid_file: default_grid_filename(),
            manifest_file: default_manifest_filename(),
        }
    }
}
