//! Configuration file tests

use familiar_datamodel::config::{ModelConfig, OutputFormat};
use tempfile::TempDir;

#[test]
fn test_load_from_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(
        &path,
        r#"
[export]
output_format = "compact"

[render]
indent = 4
"#,
    )
    .unwrap();

    let config = ModelConfig::load_from(Some(path.as_path())).unwrap();
    assert_eq!(config.export.output_format, OutputFormat::Compact);
    assert!(config.export.validate);
    assert_eq!(config.render.indent, 4);
    assert!(config.import.validate);
    assert_eq!(config.check.extension, "avsc");
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("datamodel.toml");

    let mut config = ModelConfig::default();
    config.import.validate = false;
    config.check.extension = "json".to_string();
    config.save(&path).unwrap();

    let reloaded = ModelConfig::load_from(Some(path.as_path())).unwrap();
    assert!(!reloaded.import.validate);
    assert_eq!(reloaded.check.extension, "json");
    assert_eq!(reloaded.export.output_format, OutputFormat::Pretty);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(ModelConfig::load_from(Some(dir.path().join("absent.toml").as_path())).is_err());
}
