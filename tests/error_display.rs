use dpr_lib::{DprError, ErrorCategory};

#[test]
fn config_error_display_includes_message() {
    let err = DprError::Config("missing viewport".to_string());

    assert_eq!(format!("{}", err), "Configuration error: missing viewport");
}

#[test]
fn io_error_display_wraps_source() {
    let io_err = std::io::Error::other("disk full");
    let err: DprError = io_err.into();
    let rendered = format!("{}", err);

    assert!(rendered.starts_with("IO error: "));
    assert!(rendered.contains("disk full"));
}

#[test]
fn pipeline_helper_shows_only_the_message() {
    let err = DprError::pipeline(Some(reqwest::StatusCode::NOT_FOUND), "Flow not found");

    assert_eq!(format!("{}", err), "Flow not found");
    assert_eq!(
        err.to_payload().message,
        "Pipeline error (status 404): Flow not found"
    );
}

#[test]
fn pipeline_helper_handles_missing_status() {
    let err = DprError::pipeline(None, "Unknown error");

    assert_eq!(err.to_payload().message, "Unknown error");
    assert_eq!(err.to_payload().category, ErrorCategory::Pipeline);
}

#[test]
fn aggregate_build_error_message() {
    assert_eq!(
        DprError::NoSupportedActions.to_string(),
        "No supported actions returned from AI"
    );
}
