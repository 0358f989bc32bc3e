use std::fs;

use fakeroute::config::{load_and_validate, load_from_path, RawLoaderConfig};
use fakeroute::{FakeRouteError, LoaderConfig};
use fakeroute_test_utils::init_tracing;
use tempfile::TempDir;

#[test]
fn defaults_match_the_documented_option_set() {
    init_tracing();

    let cfg = LoaderConfig::try_from(RawLoaderConfig::default()).unwrap();
    assert_eq!(cfg.include, vec!["mock"]);
    assert!(cfg.exclude.is_empty());
    assert_eq!(cfg.extensions, vec!["ts", "js", "cjs", "mjs"]);
    assert_eq!(cfg.infix.as_deref(), Some("fake"));
    assert!(cfg.watch);
    assert_eq!(cfg.concurrency, 10);
}

#[test]
fn toml_file_overrides_defaults_and_root_falls_back_to_config_dir() {
    init_tracing();

    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("fakeroute.toml");
    fs::write(
        &config_path,
        r#"
include = ["fixtures", "extra/*.fake.ts"]
exclude = ["fixtures/legacy/**"]
extensions = ["ts"]
infix = "mock"
watch = false
concurrency = 4
"#,
    )
    .unwrap();

    let cfg = load_and_validate(&config_path).unwrap();
    assert_eq!(cfg.include, vec!["fixtures", "extra/*.fake.ts"]);
    assert_eq!(cfg.exclude, vec!["fixtures/legacy/**"]);
    assert_eq!(cfg.extensions, vec!["ts"]);
    assert_eq!(cfg.infix.as_deref(), Some("mock"));
    assert!(!cfg.watch);
    assert_eq!(cfg.concurrency, 4);
    assert_eq!(cfg.root, dir.path());
}

#[test]
fn empty_infix_disables_the_naming_convention() {
    init_tracing();

    let raw = RawLoaderConfig {
        infix: String::new(),
        ..RawLoaderConfig::default()
    };
    let cfg = LoaderConfig::try_from(raw).unwrap();
    assert_eq!(cfg.infix, None);
}

#[test]
fn zero_concurrency_is_a_config_error() {
    init_tracing();

    let raw = RawLoaderConfig {
        concurrency: 0,
        ..RawLoaderConfig::default()
    };
    let err = LoaderConfig::try_from(raw).unwrap_err();
    assert!(matches!(err, FakeRouteError::Config(_)));
}

#[test]
fn malformed_extensions_are_rejected() {
    init_tracing();

    let raw = RawLoaderConfig {
        extensions: vec![".ts".to_string()],
        ..RawLoaderConfig::default()
    };
    assert!(matches!(
        LoaderConfig::try_from(raw).unwrap_err(),
        FakeRouteError::Config(_)
    ));

    let raw = RawLoaderConfig {
        extensions: vec![],
        ..RawLoaderConfig::default()
    };
    assert!(matches!(
        LoaderConfig::try_from(raw).unwrap_err(),
        FakeRouteError::Config(_)
    ));
}

#[test]
fn unknown_keys_are_a_toml_error() {
    init_tracing();

    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("fakeroute.toml");
    fs::write(&config_path, "does_not_exist = true\n").unwrap();

    let err = load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, FakeRouteError::Toml(_)));
}

#[test]
fn missing_config_file_is_an_io_error() {
    init_tracing();

    let dir = TempDir::new().unwrap();
    let err = load_from_path(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, FakeRouteError::Io(_)));
}
