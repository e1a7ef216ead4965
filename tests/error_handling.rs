// tests/error_handling.rs

use std::io::Write;

use tempfile::NamedTempFile;

use roborun::config::load_and_validate;
use roborun::errors::RoborunError;

#[test]
fn missing_test_root_returns_structured_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[runner]
test_root = "/definitely/not/here"
"#
    )
    .unwrap();

    let result = load_and_validate(file.path());

    match result {
        Err(RoborunError::ConfigError(msg)) => {
            assert!(msg.contains("test_root"));
            assert!(msg.contains("/definitely/not/here"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unset_test_root_returns_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[runner]\nbinary = \"robot\"\n").unwrap();

    let result = load_and_validate(file.path());

    match result {
        Err(RoborunError::ConfigError(msg)) => assert!(msg.contains("test_root")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn zero_stop_grace_returns_config_error() {
    let tests_dir = tempfile::tempdir().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[runner]
test_root = "{}"
stop_grace_secs = 0
"#,
        tests_dir.path().display()
    )
    .unwrap();

    let result = load_and_validate(file.path());

    match result {
        Err(RoborunError::ConfigError(msg)) => assert!(msg.contains("stop_grace_secs")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn empty_binary_returns_config_error() {
    let tests_dir = tempfile::tempdir().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[runner]
binary = "  "
test_root = "{}"
"#,
        tests_dir.path().display()
    )
    .unwrap();

    let result = load_and_validate(file.path());

    match result {
        Err(RoborunError::ConfigError(msg)) => assert!(msg.contains("binary")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn malformed_toml_returns_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[runner\nbinary = ").unwrap();

    let result = load_and_validate(file.path());

    assert!(matches!(result, Err(RoborunError::TomlError(_))));
}

#[test]
fn minimal_config_gets_defaults() {
    let tests_dir = tempfile::tempdir().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[runner]
test_root = "{}"
"#,
        tests_dir.path().display()
    )
    .unwrap();

    let config = load_and_validate(file.path()).unwrap();

    assert_eq!(config.runner.binary, "robot");
    assert_eq!(config.runner.stop_grace_secs, 5);
    assert_eq!(config.job.log_capacity, 1000);
    assert_eq!(config.video_dir(), config.paths.output_dir.join("videos"));
}
