use std::{fs, path::PathBuf};

use crate::{AppConfig, ConfigError};

#[test]
fn defaults() {
    let c = AppConfig::new();
    assert_eq!(c.runner.max_reruns, 100);
    assert_eq!(c.server.session_ttl_secs, 3600);
    assert!(c.client.show_error_details);
    assert_eq!(c.secrets.paths, vec![PathBuf::from(".rerun/secrets.toml")]);
}

#[test]
fn partial_toml() {
    let c = AppConfig::from_toml_str(
        r#"
        [runner]
        max_reruns = 3

        [client]
        show_error_details = false
        "#,
    )
    .unwrap();
    assert_eq!(c.runner.max_reruns, 3);
    assert!(!c.client.show_error_details);
    assert_eq!(c.server.session_ttl_secs, 3600);
}

#[test]
fn parse_error() {
    let e = AppConfig::from_toml_str("[runner]\nmax_reruns = \"many\"").unwrap_err();
    assert!(matches!(e, ConfigError::Parse(_)));
}

#[test]
fn load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let e = AppConfig::load(dir.path().join("config.toml")).unwrap_err();
    assert!(matches!(e, ConfigError::Read { .. }));
}

#[test]
fn discover() {
    let dir = tempfile::tempdir().unwrap();
    let c = AppConfig::discover(dir.path()).unwrap();
    assert_eq!(c.runner.max_reruns, 100);
    assert_eq!(c.secrets.paths, vec![dir.path().join(".rerun/secrets.toml")]);

    fs::create_dir(dir.path().join(".rerun")).unwrap();
    fs::write(
        dir.path().join(".rerun/config.toml"),
        "[server]\nsession_ttl_secs = 60\n[secrets]\npaths = [\"/etc/app/secrets.toml\", \"local.toml\"]\n",
    )
    .unwrap();
    let c = AppConfig::discover(dir.path()).unwrap();
    assert_eq!(c.server.session_ttl().as_secs(), 60);
    assert_eq!(
        c.secrets.paths,
        vec![
            PathBuf::from("/etc/app/secrets.toml"),
            dir.path().join("local.toml")
        ]
    );
}
