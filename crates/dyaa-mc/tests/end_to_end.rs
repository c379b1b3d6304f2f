use dyaa_core::RngHandle;
use dyaa_grid::{bin_lines, canonical_hash, ConvolutionOptions, GridAccumulator, NtupleGrid};
use dyaa_mc::{build_grid, fill_grid, run, GridFiller, RunConfig, RunManifest};
use tempfile::tempdir;

/// Per-bin `d sigma / d |yll|` of the reference run under unit luminosity and
/// unit coupling, in pb.
const REFERENCE: [f64; 24] = [
    0.03216572118319053,
    0.03632865512345443,
    0.04080540074810674,
    0.03499974654003415,
    0.037349455846727816,
    0.035860656769425826,
    0.02892380468448114,
    0.03341086217674862,
    0.027862699318433246,
    0.03184880252096862,
    0.02778903035916654,
    0.02559499964342153,
    0.02034194193205073,
    0.02003632075388487,
    0.015314095715251098,
    0.015928023443347848,
    0.011623707528045629,
    0.010995508115789896,
    0.007514910957434142,
    0.0063707911310920224,
    0.005445014038965448,
    0.003524338847752403,
    0.0018539495121948477,
    0.000840309613695403,
];

/// `x f(x) = x`, so every luminosity factor `xfx1 xfx2 / (x1 x2)` is one.
fn unit_xfx(_id: i32, x: f64, _q2: f64) -> f64 {
    x
}

fn unit_alphas(_q2: f64) -> f64 {
    1.0
}

fn reference_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.calls = 100_000;
    config.mass_window.mmin = 10.0;
    config.mass_window.mmax = 7000.0;
    config.seed_policy.master_seed = 0x0DDB_A11;
    config
}

#[test]
fn unit_luminosity_reproduces_the_accumulated_weight() {
    let outcome = run(&reference_config()).unwrap();
    let grid = &outcome.grid;

    let values = grid
        .convolute(&unit_xfx, &unit_xfx, &unit_alphas, &ConvolutionOptions::default())
        .unwrap();
    assert_eq!(values.len(), 24);
    assert!(values.iter().all(|value| *value >= 0.0));
    assert!(values[0] > 0.0);

    let integrated: f64 = values
        .iter()
        .zip(grid.bin_limits().widths())
        .map(|(value, width)| value * width)
        .sum();
    let total = grid.total_weight();
    assert!(total > 0.0);
    assert!((integrated - total).abs() <= 1e-9 * total);
    assert!((outcome.summary.weight_sum - total).abs() <= 1e-9 * total);
    assert_eq!(grid.entries() as u64, outcome.summary.accepted);

    let lines = bin_lines(grid.bin_limits(), &values).unwrap();
    assert_eq!(lines.len(), 24);
    assert!(lines[0].starts_with("0.0 0.1 "));
    assert!(lines[23].starts_with("2.3 2.4 "));
}

#[test]
fn reference_run_matches_pinned_cross_sections() {
    let outcome = run(&reference_config()).unwrap();
    assert_eq!(outcome.summary.calls, 100_000);
    assert_eq!(outcome.summary.accepted, 4009);
    assert_eq!(outcome.summary.rejected, 95_991);
    assert_eq!(outcome.summary.degenerate, 0);
    let weight_sum = 0.05127287465036633;
    assert!((outcome.summary.weight_sum - weight_sum).abs() <= 1e-10 * weight_sum);

    let values = outcome
        .grid
        .convolute(&unit_xfx, &unit_xfx, &unit_alphas, &ConvolutionOptions::default())
        .unwrap();
    for (bin, (value, reference)) in values.iter().zip(REFERENCE).enumerate() {
        assert!(
            (value - reference).abs() <= 1e-10 * reference,
            "bin {bin}: {value:e} vs {reference:e}"
        );
    }

    let lines = bin_lines(outcome.grid.bin_limits(), &values).unwrap();
    assert_eq!(lines[0], "0.0 0.1 3.217e-02");
    assert_eq!(lines[23], "2.3 2.4 8.403e-04");
}

#[test]
fn fill_grid_matches_the_driver() {
    let mut config = reference_config();
    config.calls = 20_000;
    let outcome = run(&config).unwrap();

    let mut grid = build_grid(&config.grid).unwrap();
    let mut rng = RngHandle::from_seed(config.seed_policy.master_seed);
    let summary = fill_grid(&mut rng, &mut grid, 20_000, 10.0, 7000.0).unwrap();
    assert_eq!(canonical_hash(&grid), outcome.grid_hash);
    assert_eq!(summary, outcome.summary);

    let mut filler_grid = build_grid(&config.grid).unwrap();
    let mut rng = RngHandle::from_seed(config.seed_policy.master_seed);
    GridFiller::drell_yan_aa(10.0, 7000.0)
        .unwrap()
        .run(&mut rng, &mut filler_grid, 20_000)
        .unwrap();
    assert_eq!(canonical_hash(&filler_grid), outcome.grid_hash);

    let err = fill_grid(&mut rng, &mut grid, 10, 60.0, 10.0).unwrap_err();
    assert_eq!(err.info().code, "mass-window");
}

#[test]
fn reference_run_reproduces_itself() {
    let first = run(&reference_config()).unwrap();
    let second = run(&reference_config()).unwrap();
    assert_eq!(first.grid_hash, second.grid_hash);

    let options = ConvolutionOptions::default();
    let lhs = first
        .grid
        .convolute(&unit_xfx, &unit_xfx, &unit_alphas, &options)
        .unwrap();
    let rhs = second
        .grid
        .convolute(&unit_xfx, &unit_xfx, &unit_alphas, &options)
        .unwrap();
    assert_eq!(lhs, rhs);
}

#[test]
fn scale_variations_leave_a_pure_alpha_order_unchanged() {
    let mut config = reference_config();
    config.calls = 10_000;
    let outcome = run(&config).unwrap();
    let options = ConvolutionOptions {
        xi: vec![(1.0, 1.0), (2.0, 0.5)],
        ..ConvolutionOptions::default()
    };
    let values = outcome
        .grid
        .convolute(&unit_xfx, &unit_xfx, &unit_alphas, &options)
        .unwrap();
    assert_eq!(values.len(), 48);
    for pair in values.chunks(2) {
        assert!((pair[0] - pair[1]).abs() <= 1e-12 * pair[0].abs());
    }
}

#[test]
fn artefacts_are_written_and_reload() {
    let dir = tempdir().unwrap();
    let mut config = reference_config();
    config.calls = 5_000;
    config.seed_policy.label = Some("e2e".to_string());
    config.output.run_directory = Some(dir.path().join("run"));

    let outcome = run(&config).unwrap();
    let grid_path = outcome.grid_path.clone().unwrap();
    let manifest_path = outcome.manifest_path.clone().unwrap();
    assert!(grid_path.exists());
    assert!(manifest_path.exists());

    let reloaded = NtupleGrid::read(&grid_path).unwrap();
    assert_eq!(dyaa_grid::canonical_hash(&reloaded), outcome.grid_hash);
    assert_eq!(reloaded.provenance().calls, 5_000);
    assert_eq!(reloaded.provenance().created_by, "e2e");

    let manifest = RunManifest::load(&manifest_path).unwrap();
    assert_eq!(manifest.grid_hash, outcome.grid_hash);
    assert_eq!(manifest.master_seed, 0x0DDB_A11);
    assert_eq!(manifest.seed_label.as_deref(), Some("e2e"));
    assert_eq!(manifest.summary.accepted, outcome.summary.accepted);
    assert_eq!(manifest.config.calls, 5_000);
}
