//! Configuration file loading tests

use linerelay_cli::{AppConfig, CliError};
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r#"
[pipeline]
default_mode = 4
max_line_len = 64
verbose = true
"#,
    );

    let config = AppConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.pipeline.default_mode, 4);
    assert_eq!(config.pipeline.max_line_len, 64);
    assert!(config.pipeline.verbose);
}

#[test]
fn test_flag_overrides_file() {
    let file = write_config("[pipeline]\ndefault_mode = 4\n");
    let config = AppConfig::load_from_file(file.path())
        .unwrap()
        .with_overrides(Some(1), false)
        .unwrap();
    assert_eq!(config.pipeline.default_mode, 1);
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = AppConfig::load_from_file(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(CliError::Config(_))));
}

#[test]
fn test_zero_line_length_rejected() {
    let file = write_config("[pipeline]\nmax_line_len = 0\n");
    assert!(matches!(
        AppConfig::load_from_file(file.path()),
        Err(CliError::Pipeline(_))
    ));
}
