use dyaa_mc::{run, RunConfig};

fn estimate(calls: u64, seed: u64) -> (f64, f64) {
    let mut config = RunConfig::default();
    config.calls = calls;
    config.seed_policy.master_seed = seed;
    run(&config).unwrap().summary.estimate()
}

#[test]
fn statistical_error_scales_with_inverse_sqrt_calls() {
    let (value_small, error_small) = estimate(10_000, 101);
    let (value_large, error_large) = estimate(160_000, 202);

    assert!(error_small > 0.0 && error_large > 0.0);
    let ratio = error_small / error_large;
    assert!((3.0..=5.0).contains(&ratio), "error ratio {ratio}");

    let combined = (error_small * error_small + error_large * error_large).sqrt();
    assert!((value_small - value_large).abs() <= 5.0 * combined);
}

#[test]
fn relative_error_is_small_for_the_reference_run() {
    let (value, error) = estimate(100_000, 7);
    assert!(value > 0.0);
    assert!(error / value < 0.05, "relative error {}", error / value);
}
