use std::fs;

use dyaa_grid::GridAccumulator;
use dyaa_mc::{build_grid, Crossing, RunConfig, RunManifest, ScaleChoice};
use tempfile::tempdir;

#[test]
fn empty_document_yields_defaults() {
    let config = RunConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, RunConfig::default());
    assert_eq!(config.calls, 100_000);
    assert_eq!(config.mass_window.mmin, 10.0);
    assert_eq!(config.mass_window.mmax, 7000.0);
    assert_eq!(config.scale, ScaleChoice::Fixed { q2: 8100.0 });
    assert_eq!(config.crossing, Crossing::SwapTU);
    assert_eq!(config.grid.bin_limits.len(), 25);
    config.validate().unwrap();
}

#[test]
fn partial_document_overrides_selected_fields() {
    let yaml = r#"
calls: 5000
workers: 2
mass_window:
  mmin: 20.0
scale:
  type: dynamic
crossing: as-generated
cuts:
  ptl_min: 20.0
seed_policy:
  master_seed: 99
  label: smoke
grid:
  bin_limits: [0.0, 1.0, 2.4]
"#;
    let config = RunConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.calls, 5000);
    assert_eq!(config.workers, 2);
    assert_eq!(config.mass_window.mmin, 20.0);
    assert_eq!(config.mass_window.mmax, 7000.0);
    assert_eq!(config.scale, ScaleChoice::Dynamic);
    assert_eq!(config.crossing, Crossing::AsGenerated);
    assert_eq!(config.cuts.ptl_min, 20.0);
    assert_eq!(config.cuts.mll_max, 120.0);
    assert_eq!(config.seed_policy.label.as_deref(), Some("smoke"));
    config.validate().unwrap();

    let grid = build_grid(&config.grid).unwrap();
    assert_eq!(grid.bin_limits().bins(), 2);
    assert_eq!(grid.channels().len(), 1);
    assert_eq!(grid.orders().len(), 1);
}

#[test]
fn fixed_scale_without_value_uses_default() {
    let config = RunConfig::from_yaml_str("scale:\n  type: fixed\n").unwrap();
    assert_eq!(config.scale, ScaleChoice::Fixed { q2: 8100.0 });
}

#[test]
fn validation_rejects_misconfiguration() {
    let code = |yaml: &str| {
        RunConfig::from_yaml_str(yaml)
            .unwrap()
            .validate()
            .unwrap_err()
            .info()
            .code
            .clone()
    };
    assert_eq!(code("calls: 0"), "zero-calls");
    assert_eq!(code("mass_window: {mmin: 120.0, mmax: 60.0}"), "mass-window");
    assert_eq!(code("mass_window: {mmin: 0.0}"), "mass-window");
    assert_eq!(code("workers: 0"), "worker-count");
    assert_eq!(code("order_index: 1"), "order-index");
    assert_eq!(code("channel_index: 3"), "channel-index");
    assert_eq!(code("grid: {bin_limits: [0.0, 2.0, 1.0]}"), "bin-order");
    assert_eq!(code("grid: {bin_limits: [0.0]}"), "bin-count");
    assert_eq!(code("scale: {type: fixed, q2: -1.0}"), "scale-q2");
    assert_eq!(code("cuts: {mll_min: .nan}"), "cut-window");
    assert_eq!(code("cuts: {mll_min: 130.0}"), "cut-window");
    assert_eq!(code("cuts: {ptl_min: .inf}"), "cut-window");
}

#[test]
fn malformed_yaml_is_a_config_error() {
    let err = RunConfig::from_yaml_str("calls: [not, a, number]").unwrap_err();
    assert_eq!(err.info().code, "config-parse");
}

#[test]
fn load_reads_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.yaml");
    fs::write(&path, "calls: 1234\n").unwrap();
    assert_eq!(RunConfig::load(&path).unwrap().calls, 1234);

    let missing = RunConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
    assert_eq!(missing.info().code, "config-read");
}

#[test]
fn manifest_roundtrips_through_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("manifest.json");
    let manifest = RunManifest {
        config: RunConfig::default(),
        master_seed: 17,
        seed_label: Some("roundtrip".to_string()),
        grid_hash: "abc123".to_string(),
        grid_file: Some("DY-LO-AA.grid".into()),
        summary: Default::default(),
    };
    manifest.write(&path).unwrap();
    let loaded = RunManifest::load(&path).unwrap();
    assert_eq!(loaded, manifest);

    let err = RunManifest::load(&dir.path().join("missing.json")).unwrap_err();
    assert_eq!(err.info().code, "manifest-read");
}
