//! Unit tests for `AppError` display format.

use wallpaper_host::AppError;

#[test]
fn launch_error_display_includes_prefix_and_message() {
    let err = AppError::Launch("worker executable not found".into());
    assert_eq!(err.to_string(), "launch: worker executable not found");
}

#[test]
fn handshake_error_is_distinct_from_launch_error() {
    let handshake = AppError::Handshake("bad payload".into());
    let launch = AppError::Launch("bad payload".into());
    assert_ne!(handshake.to_string(), launch.to_string());
    assert!(handshake.to_string().starts_with("handshake:"));
}

#[test]
fn error_messages_have_no_trailing_period() {
    for err in [
        AppError::Config("missing field".into()),
        AppError::Window("hide failed".into()),
        AppError::InvalidState("already shown".into()),
        AppError::Io("broken pipe".into()),
    ] {
        let s = err.to_string();
        assert!(!s.ends_with('.'), "error message must not end with a period: {s}");
    }
}

#[test]
fn io_error_converts_to_io_variant() {
    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
    let err: AppError = io.into();
    assert!(matches!(err, AppError::Io(ref msg) if msg.contains("pipe closed")));
}

#[test]
fn toml_error_converts_to_config_variant() {
    let parse: Result<toml::Value, _> = toml::from_str("not = [valid");
    let err: AppError = parse.unwrap_err().into();
    assert!(err.to_string().starts_with("config: invalid config"));
}
