use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use wallpaper_host::config::{ContentRequest, GlobalConfig, PROPERTY_FILE_NAME};
use wallpaper_host::models::content::{ContentKind, ContentSource};
use wallpaper_host::models::display::{DisplayDescriptor, Rect};
use wallpaper_host::worker::lifecycle::CloseStrategy;
use wallpaper_host::AppError;

fn sample_toml() -> String {
    r#"
worker_executable = "/opt/lively/plugins/cef/LivelyCefSharp"
worker_leading_args = ["--no-sandbox"]
data_dir = "/var/lib/lively"
audio_volume = 70
web_debug_port = 9222
disk_cache = true
launcher_shortcut = "/opt/lively/launcher.lnk"
handshake_timeout_seconds = 15

[close]
graceful = true
grace_seconds = 6
"#
    .to_owned()
}

fn minimal_toml() -> String {
    r#"
worker_executable = "/opt/lively/plugins/cef/LivelyCefSharp"
data_dir = "/var/lib/lively"
"#
    .to_owned()
}

fn display(id: &str) -> DisplayDescriptor {
    DisplayDescriptor::new(id, Rect::default())
}

fn request(kind: ContentKind, folder: Option<&str>) -> ContentRequest {
    ContentRequest {
        source: ContentSource::Url("https://example.com".to_owned()),
        kind,
        arguments: "--fps 60".to_owned(),
        wallpaper_folder: folder.map(PathBuf::from),
    }
}

#[test]
fn parses_full_config() {
    let config = GlobalConfig::from_toml_str(&sample_toml()).expect("valid config");

    assert_eq!(config.audio_volume, 70);
    assert_eq!(config.web_debug_port, Some(9222));
    assert!(config.disk_cache);
    assert_eq!(config.handshake_timeout(), Duration::from_secs(15));
    assert_eq!(
        config.close_strategy(),
        CloseStrategy::Graceful {
            timeout: Duration::from_secs(6)
        }
    );

    let spec = config.launch_spec();
    assert_eq!(spec.leading_args, vec!["--no-sandbox".to_owned()]);
    assert_eq!(spec.working_dir, None);
}

#[test]
fn minimal_config_uses_defaults() {
    let config = GlobalConfig::from_toml_str(&minimal_toml()).expect("valid config");

    assert_eq!(config.audio_volume, 50);
    assert_eq!(config.web_debug_port, None);
    assert!(!config.disk_cache);
    assert_eq!(config.launcher_shortcut, None);
    assert_eq!(config.handshake_timeout(), Duration::from_secs(30));
    assert_eq!(config.close_strategy(), CloseStrategy::Immediate);
}

#[test]
fn rejects_volume_above_one_hundred() {
    let raw = format!("{}audio_volume = 101\n", minimal_toml());
    let err = GlobalConfig::from_toml_str(&raw).unwrap_err();
    assert!(matches!(err, AppError::Config(ref msg) if msg.contains("audio_volume")));
}

#[test]
fn rejects_zero_handshake_timeout() {
    let raw = format!("{}handshake_timeout_seconds = 0\n", minimal_toml());
    assert!(matches!(
        GlobalConfig::from_toml_str(&raw),
        Err(AppError::Config(_))
    ));
}

#[test]
fn rejects_zero_grace_when_graceful() {
    let raw = format!("{}[close]\ngraceful = true\ngrace_seconds = 0\n", minimal_toml());
    assert!(matches!(
        GlobalConfig::from_toml_str(&raw),
        Err(AppError::Config(_))
    ));
}

#[test]
fn rejects_missing_executable() {
    let err = GlobalConfig::from_toml_str("data_dir = \"/tmp\"\n").unwrap_err();
    assert!(err.to_string().starts_with("config: invalid config"));
}

#[test]
fn worker_config_for_online_content_uses_cache_root() {
    let config = GlobalConfig::from_toml_str(&sample_toml()).expect("valid config");
    let content = request(ContentKind::Online, Some("/walls/rain"));
    let worker = config.worker_config(&content, &display("4"));

    assert_eq!(worker.volume, 70);
    assert_eq!(worker.debug_port, Some(9222));
    assert_eq!(
        worker.cache_dir,
        Some(Path::new("/var/lib/lively").join("Cef").join("cache"))
    );
    assert_eq!(worker.property_path, None, "online content never gets a property path");
    assert_eq!(worker.extra_args, "--fps 60");
    assert_eq!(
        worker.launcher_shortcut,
        Some(PathBuf::from("/opt/lively/launcher.lnk"))
    );
}

#[test]
fn worker_config_for_local_content_uses_per_display_property_copy() {
    let config = GlobalConfig::from_toml_str(&minimal_toml()).expect("valid config");
    let content = request(ContentKind::Local, Some("/walls/rain"));
    let worker = config.worker_config(&content, &display("4"));

    let expected = Path::new("/var/lib/lively")
        .join("SaveData")
        .join("wpdata")
        .join("rain")
        .join("4")
        .join(PROPERTY_FILE_NAME);
    assert_eq!(worker.property_path, Some(expected));
    assert_eq!(worker.cache_dir, None, "disk cache disabled in config");
}

#[test]
fn worker_config_without_wallpaper_folder_has_no_property_path() {
    let config = GlobalConfig::from_toml_str(&minimal_toml()).expect("valid config");
    let worker = config.worker_config(&request(ContentKind::Local, None), &display("1"));
    assert_eq!(worker.property_path, None);
}

#[test]
fn load_from_path_reads_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(sample_toml().as_bytes()).expect("write config");

    let config = GlobalConfig::load_from_path(file.path()).expect("load config");
    assert_eq!(config.audio_volume, 70);
}

#[test]
fn load_from_missing_path_is_config_error() {
    let err = GlobalConfig::load_from_path("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, AppError::Config(ref msg) if msg.contains("failed to read config")));
}
