use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::{tempdir, NamedTempFile};

use netlify_deploy::load_config::{config_path, load_config, load_credentials};
use netlify_deploy_core::build_step::BuildCommand;
use netlify_deploy_core::collect::ManifestRoot;
use netlify_deploy_core::DeployError;

/// A missing file yields the built-in defaults.
#[test]
fn test_load_config_defaults_when_file_missing() {
    let dir = tempdir().unwrap();
    let config = load_config(dir.path().join("netlify-deploy.yaml")).expect("defaults should load");

    assert_eq!(config.site.name.as_deref(), Some("trendmaster-app"));
    assert_eq!(config.site.account_slug.as_deref(), Some("kingivthe1st"));
    assert!(config.site.force_ssl);
    assert!(config.site.processing_settings.js.bundle);
    assert_eq!(config.build.working_dir, PathBuf::from("frontend"));
    assert_eq!(
        config.build.commands,
        vec![
            BuildCommand::new("npm", &["install"]),
            BuildCommand::new("npm", &["run", "build"]),
        ]
    );
    assert_eq!(
        config.roots,
        vec![
            ManifestRoot::new(PathBuf::from("frontend").join("build"), ""),
            ManifestRoot::new(PathBuf::from("netlify").join("functions"), "functions"),
        ]
    );
    assert_eq!(config.poll.interval, Duration::from_secs(10));
    assert_eq!(config.poll.max_attempts, 30);
}

/// Values in the file override the defaults section by section.
#[test]
fn test_load_config_overrides() {
    let config_yaml = r#"
site:
  name: trendmaster-app
  account_slug: my-team
build:
  working_dir: web
  commands:
    - [yarn, build]
publish:
  - source: web/out
    prefix: ""
  - source: lambdas
    prefix: functions
poll:
  interval_secs: 2
  max_attempts: 5
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.site.name.as_deref(), Some("trendmaster-app"));
    assert_eq!(config.site.account_slug.as_deref(), Some("my-team"));
    assert_eq!(config.build.working_dir, PathBuf::from("web"));
    assert_eq!(config.build.commands, vec![BuildCommand::new("yarn", &["build"])]);
    assert_eq!(
        config.roots,
        vec![
            ManifestRoot::new("web/out", ""),
            ManifestRoot::new("lambdas", "functions"),
        ]
    );
    assert_eq!(config.poll.interval, Duration::from_secs(2));
    assert_eq!(config.poll.max_attempts, 5);
}

/// A partial file keeps the defaults for everything it does not mention.
#[test]
fn test_load_config_partial_file_keeps_defaults() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "site:\n  name: only-name\n").unwrap();

    let config = load_config(config_file.path()).unwrap();

    assert_eq!(config.site.name.as_deref(), Some("only-name"));
    assert_eq!(config.site.account_slug.as_deref(), Some("kingivthe1st"));
    assert_eq!(config.build.working_dir, PathBuf::from("frontend"));
    assert_eq!(config.roots.len(), 2);
    assert_eq!(config.poll.max_attempts, 30);
}

#[test]
fn test_load_config_empty_file_is_defaults() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "").unwrap();

    let config = load_config(config_file.path()).unwrap();
    assert_eq!(config.poll.max_attempts, 30);
}

#[test]
fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"site: [:::").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("parse") && msg.contains("YAML"), "Parse error expected, got: {msg}");
    assert!(matches!(err.downcast_ref::<DeployError>(), Some(DeployError::Config(_))));
}

#[test]
fn test_load_config_rejects_unknown_keys_and_bad_values() {
    let typo = NamedTempFile::new().expect("temp file");
    write(typo.path(), "buld:\n  working_dir: web\n").unwrap();
    assert!(load_config(typo.path()).is_err());

    let empty_command = NamedTempFile::new().expect("temp file");
    write(empty_command.path(), "build:\n  commands:\n    - []\n").unwrap();
    let msg = load_config(empty_command.path()).unwrap_err().to_string();
    assert!(msg.contains("build.commands"), "got: {msg}");

    let zero_attempts = NamedTempFile::new().expect("temp file");
    write(zero_attempts.path(), "poll:\n  max_attempts: 0\n").unwrap();
    let msg = load_config(zero_attempts.path()).unwrap_err().to_string();
    assert!(msg.contains("max_attempts"), "got: {msg}");
}

#[test]
#[serial]
fn test_config_path_honours_env_override() {
    env::remove_var("NETLIFY_DEPLOY_CONFIG");
    assert_eq!(config_path(), PathBuf::from("netlify-deploy.yaml"));

    env::set_var("NETLIFY_DEPLOY_CONFIG", "/etc/deploy.yaml");
    assert_eq!(config_path(), PathBuf::from("/etc/deploy.yaml"));
    env::remove_var("NETLIFY_DEPLOY_CONFIG");
}

#[test]
#[serial]
fn test_load_credentials_reads_and_trims_token() {
    env::set_var("NETLIFY_TOKEN", "  nfp_abc123  ");
    let credentials = load_credentials().expect("token should load");
    assert_eq!(credentials.token(), "nfp_abc123");
    assert!(!format!("{credentials:?}").contains("nfp_abc123"));
    env::remove_var("NETLIFY_TOKEN");
}

#[test]
#[serial]
fn test_load_credentials_errors_on_missing_env() {
    env::remove_var("NETLIFY_TOKEN");
    let err = load_credentials().unwrap_err();
    assert!(matches!(err, DeployError::Config(ref msg) if msg.contains("NETLIFY_TOKEN")));
}
