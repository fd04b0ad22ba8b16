// Configuration module unit tests

use std::io::Write;

use torii::config::Config;

fn minimal_yaml() -> &'static str {
    r#"
server:
  address: "127.0.0.1"
  port: 8080
access:
  allowed_client_ips:
    - "203.0.113.7"
  allowed_source_origins:
    - "images.unsplash.com"
"#
}

#[test]
fn test_can_deserialize_minimal_valid_yaml_config() {
    let config = Config::from_yaml_with_env(minimal_yaml()).expect("Failed to load config");
    assert_eq!(config.server.address, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn test_server_defaults_applied() {
    let config = Config::from_yaml_with_env(minimal_yaml()).expect("Failed to load config");
    assert_eq!(config.server.threads, 4);
    assert_eq!(config.server.timeout, 20);
}

#[test]
fn test_access_header_default_applied() {
    let config = Config::from_yaml_with_env(minimal_yaml()).expect("Failed to load config");
    assert_eq!(config.access.client_ip_header, "cf-connecting-ip");
}

#[test]
fn test_preset_defaults_applied() {
    let config = Config::from_yaml_with_env(minimal_yaml()).expect("Failed to load config");
    assert_eq!(config.presets.thumbnail, 150);
    assert_eq!(config.presets.small, 320);
    assert_eq!(config.presets.medium, 640);
    assert_eq!(config.presets.large, 1024);
}

#[test]
fn test_preset_overrides() {
    let yaml = r#"
server:
  address: "127.0.0.1"
  port: 8080
access:
  allowed_client_ips: ["203.0.113.7"]
  allowed_source_origins: ["images.unsplash.com"]
presets:
  thumbnail: 96
"#;
    let config = Config::from_yaml_with_env(yaml).expect("Failed to load config");
    assert_eq!(config.presets.thumbnail, 96);
    // Unlisted presets keep their defaults
    assert_eq!(config.presets.large, 1024);
}

#[test]
fn test_env_var_substitution() {
    std::env::set_var("TORII_TEST_ORIGIN", "images.unsplash.com");
    let yaml = r#"
server:
  address: "127.0.0.1"
  port: 8080
access:
  allowed_client_ips: ["203.0.113.7"]
  allowed_source_origins: ["${TORII_TEST_ORIGIN}"]
"#;
    let config = Config::from_yaml_with_env(yaml).expect("Failed to load config");
    assert_eq!(
        config.access.allowed_source_origins,
        vec!["images.unsplash.com".to_string()]
    );
}

#[test]
fn test_unset_env_var_is_an_error() {
    let yaml = r#"
server:
  address: "${TORII_TEST_UNSET_VARIABLE}"
  port: 8080
access:
  allowed_client_ips: ["203.0.113.7"]
  allowed_source_origins: ["images.unsplash.com"]
"#;
    let result = Config::from_yaml_with_env(yaml);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .contains("TORII_TEST_UNSET_VARIABLE"));
}

#[test]
fn test_config_deserialization_fails_with_empty_file() {
    let result = Config::from_yaml_with_env("");
    assert!(
        result.is_err(),
        "Expected deserialization to fail with empty file"
    );
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(minimal_yaml().as_bytes())
        .expect("Failed to write temp file");

    let config = Config::from_file(file.path()).expect("Failed to load config from file");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn test_from_file_missing_path_is_an_error() {
    let result = Config::from_file("/nonexistent/torii.yaml");
    assert!(result.is_err());
}

#[test]
fn test_validate_accepts_minimal_config() {
    let config = Config::from_yaml_with_env(minimal_yaml()).expect("Failed to load config");
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_empty_client_allowlist() {
    let yaml = r#"
server:
  address: "127.0.0.1"
  port: 8080
access:
  allowed_client_ips: []
  allowed_source_origins: ["images.unsplash.com"]
"#;
    let config = Config::from_yaml_with_env(yaml).expect("Failed to load config");
    let err = config.validate().unwrap_err();
    assert!(err.contains("client IP"));
}

#[test]
fn test_validate_rejects_empty_origin_allowlist() {
    let yaml = r#"
server:
  address: "127.0.0.1"
  port: 8080
access:
  allowed_client_ips: ["203.0.113.7"]
  allowed_source_origins: []
"#;
    let config = Config::from_yaml_with_env(yaml).expect("Failed to load config");
    let err = config.validate().unwrap_err();
    assert!(err.contains("source origin"));
}

#[test]
fn test_validate_rejects_zero_port() {
    let yaml = r#"
server:
  address: "127.0.0.1"
  port: 0
access:
  allowed_client_ips: ["203.0.113.7"]
  allowed_source_origins: ["images.unsplash.com"]
"#;
    let config = Config::from_yaml_with_env(yaml).expect("Failed to load config");
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_preset() {
    let yaml = r#"
server:
  address: "127.0.0.1"
  port: 8080
access:
  allowed_client_ips: ["203.0.113.7"]
  allowed_source_origins: ["images.unsplash.com"]
presets:
  medium: 0
"#;
    let config = Config::from_yaml_with_env(yaml).expect("Failed to load config");
    let err = config.validate().unwrap_err();
    assert!(err.contains("medium"));
}
