// tests/config_validation.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;

use sitegraph::config::{load_and_validate, ConfigFile, EnvMode};
use sitegraph::errors::SitegraphError;

type TestResult = Result<(), Box<dyn Error>>;

fn load_toml(contents: &str) -> sitegraph::errors::Result<ConfigFile> {
    let mut file = tempfile::NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write config");
    load_and_validate(file.path())
}

#[test]
fn minimal_config_loads_with_defaults() -> TestResult {
    init_tracing();

    let cfg = load_toml(
        r#"
        [task.assets]
        select = ["assets/**/*"]
        transforms = ["copy"]
        "#,
    )?;

    assert_eq!(cfg.paths.src.to_str(), Some("src"));
    assert_eq!(cfg.paths.dest.to_str(), Some("wwwroot"));
    assert_eq!(cfg.paths.scratch.to_str(), Some("tmp"));
    assert_eq!(cfg.site.env, EnvMode::Development);
    assert_eq!(cfg.site.base_url, "http://localhost");
    Ok(())
}

#[test]
fn empty_config_is_rejected() {
    init_tracing();

    let err = load_toml("").unwrap_err();
    assert!(matches!(err, SitegraphError::Config(_)), "got {err:?}");
}

#[test]
fn select_without_transforms_is_rejected() {
    init_tracing();

    let err = load_toml(
        r#"
        [task.broken]
        select = ["**/*.less"]
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("broken"), "got {err}");
}

#[test]
fn unknown_dependency_is_rejected() {
    init_tracing();

    let err = load_toml(
        r#"
        [task.build]
        after = ["nonexistent"]
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("nonexistent"), "got {err}");
}

#[test]
fn unknown_transform_reference_is_rejected() {
    init_tracing();

    let err = load_toml(
        r#"
        [task.styles]
        select = ["**/*.less"]
        transforms = ["compile-styles"]
        "#,
    )
    .unwrap_err();
    assert!(
        matches!(err, SitegraphError::UnknownTransform { ref task, ref transform }
            if task == "styles" && transform == "compile-styles"),
        "got {err:?}"
    );
}

#[test]
fn dependency_cycle_is_rejected_before_any_side_effect() {
    init_tracing();

    let err = load_toml(
        r#"
        [task.a]
        after = ["b"]

        [task.b]
        after = ["a"]
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, SitegraphError::Cycle(_)), "got {err:?}");
}

#[test]
fn malformed_glob_is_rejected_at_load_time() {
    init_tracing();

    let err = load_toml(
        r#"
        [task.styles]
        select = ["styles/[.less"]
        transforms = ["copy"]
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, SitegraphError::Config(_)), "got {err:?}");
}

#[test]
fn clean_path_outside_managed_roots_is_rejected() {
    init_tracing();

    let err = load_toml(
        r#"
        [task.clean]
        clean = ["/etc"]
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("/etc"), "got {err}");
}

#[test]
fn exclusion_only_selector_is_valid_but_selects_nothing() -> TestResult {
    init_tracing();

    // Zero include patterns is a legal config; the working set is empty.
    let cfg = load_toml(
        r#"
        [task.odd]
        select = ["!**/*.tmp"]
        transforms = ["copy"]
        "#,
    )?;
    assert!(cfg.task.contains_key("odd"));
    Ok(())
}
