use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use dyaa_core::{GenError, RngHandle, RunProvenance};
use dyaa_grid::{canonical_hash, GridAccumulator, NtupleGrid};

use crate::config::{GridLayout, RunConfig};
use crate::filler::{FillSummary, GridFiller};
use crate::manifest::RunManifest;
use crate::phase_space::HadronicPhaseSpace;
use crate::workers;

/// Everything produced by [`run`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The filled grid.
    pub grid: NtupleGrid,
    /// Counters and weight moments of the event loop.
    pub summary: FillSummary,
    /// Canonical hash of `grid`.
    pub grid_hash: String,
    /// Where the grid was written, if an output directory was configured.
    pub grid_path: Option<PathBuf>,
    /// Where the manifest was written, if an output directory was configured.
    pub manifest_path: Option<PathBuf>,
}

/// Creates an empty grid from a configured layout.
pub fn build_grid(layout: &GridLayout) -> Result<NtupleGrid, GenError> {
    NtupleGrid::new(layout.lumi()?, layout.orders(), layout.bin_limits()?)
}

/// Creates the photon-photon filler described by `config`.
pub fn build_filler(config: &RunConfig) -> Result<GridFiller, GenError> {
    let phase_space = HadronicPhaseSpace::new(config.mass_window.mmin, config.mass_window.mmax)?;
    Ok(GridFiller::new(
        phase_space,
        Default::default(),
        config.cuts.clone(),
    )
    .with_crossing(config.crossing)
    .with_scale(config.scale)
    .with_slot(config.order_index, config.channel_index))
}

/// Validates `config`, fills a fresh grid and writes the artefacts.
pub fn run(config: &RunConfig) -> Result<RunOutcome, GenError> {
    execute(config, None)
}

/// Like [`run`], stopping early once `cancel` is set.
pub fn run_cancellable(config: &RunConfig, cancel: &AtomicBool) -> Result<RunOutcome, GenError> {
    execute(config, Some(cancel))
}

fn execute(config: &RunConfig, cancel: Option<&AtomicBool>) -> Result<RunOutcome, GenError> {
    config.validate()?;
    let filler = build_filler(config)?;
    let mut grid = build_grid(&config.grid)?;
    grid.set_provenance(provenance(config));

    let master_seed = config.seed_policy.master_seed;
    log::info!(
        "filling {} calls in [{}, {}] GeV with {} worker(s), seed {:#x}",
        config.calls,
        config.mass_window.mmin,
        config.mass_window.mmax,
        config.workers,
        master_seed
    );

    let summary = if config.workers <= 1 {
        let mut rng = RngHandle::from_seed(master_seed);
        match cancel {
            Some(flag) => filler.run_cancellable(&mut rng, &mut grid, config.calls, flag)?,
            None => filler.run(&mut rng, &mut grid, config.calls)?,
        }
    } else {
        workers::run_partitioned(
            &filler,
            &mut grid,
            config.calls,
            config.workers,
            master_seed,
            cancel,
        )?
    };

    let (value, error) = summary.estimate();
    log::info!(
        "accepted {} of {} events ({:.2}%), fiducial sum {:.6e} ± {:.2e} pb",
        summary.accepted,
        summary.calls,
        100.0 * summary.acceptance(),
        value,
        error
    );

    let grid_hash = canonical_hash(&grid);
    let mut grid_path = None;
    let mut manifest_path = None;
    if let Some(directory) = &config.output.run_directory {
        let path = directory.join(&config.output.grid_file);
        grid.write(&path)?;

        let manifest = RunManifest {
            config: config.clone(),
            master_seed,
            seed_label: config.seed_policy.label.clone(),
            grid_hash: grid_hash.clone(),
            grid_file: Some(config.output.grid_file.clone()),
            summary: summary.clone(),
        };
        let path_manifest = directory.join(&config.output.manifest_file);
        manifest.write(&path_manifest)?;
        log::info!(
            "wrote grid to {} and manifest to {}",
            path.display(),
            path_manifest.display()
        );
        grid_path = Some(path);
        manifest_path = Some(path_manifest);
    }

    Ok(RunOutcome {
        grid,
        summary,
        grid_hash,
        grid_path,
        manifest_path,
    })
}

fn provenance(config: &RunConfig) -> RunProvenance {
    let mut tool_versions = BTreeMap::new();
    tool_versions.insert(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    RunProvenance {
        seed: config.seed_policy.master_seed,
        calls: config.calls,
        mmin: config.mass_window.mmin,
        mmax: config.mass_window.mmax,
        created_by: config
            .seed_policy
            .label
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string()),
        tool_versions,
    }
}
