use dyaa_core::errors::{ErrorInfo, GenError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("mmin", "10")
        .with_context("mmax", "5")
}

#[test]
fn config_error_surface() {
    let err = GenError::Config(sample_info("mass-window", "mmin must be below mmax"));
    assert_eq!(err.info().code, "mass-window");
    assert!(err.info().context.contains_key("mmin"));
}

#[test]
fn display_carries_context_and_hint() {
    let err = GenError::Grid(
        ErrorInfo::new("bin-order", "bin limits must ascend")
            .with_context("index", "3")
            .with_hint("sort the limits"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("grid error: bin limits must ascend (code: bin-order)"));
    assert!(rendered.contains("index=3"));
    assert!(rendered.ends_with("hint: sort the limits"));
}

#[test]
fn shorthand_constructors_pick_family() {
    assert!(matches!(GenError::config("c", "m"), GenError::Config(_)));
    assert!(matches!(GenError::grid("g", "m"), GenError::Grid(_)));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = GenError::Serde(ErrorInfo::new("S001", "schema mismatch"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Serde");
    assert_eq!(json["detail"]["code"], "S001");
}
