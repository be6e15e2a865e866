use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn pointfade(config_dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pointfade"))
        .env("POINTFADE_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run pointfade")
}

#[test]
fn config_show_prints_file_values() {
    let root = TempDir::new().unwrap();
    let config_path = root.path().join("field.toml");
    fs::write(
        &config_path,
        "[grid]\nwidth = 64\nheight = 32\n\n[press]\nduration = \"750ms\"\n",
    )
    .unwrap();

    let output = pointfade(
        root.path(),
        &["config", "show", "--config", config_path.to_str().unwrap()],
    );
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("width = 64"), "{stdout}");
    assert!(stdout.contains("height = 32"), "{stdout}");
    assert!(stdout.contains("duration = \"750ms\""), "{stdout}");
    assert!(stdout.contains("scale = 4000.0"), "{stdout}");
}

#[test]
fn config_show_applies_flags_and_renders_json() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("pointfade.toml"), "[grid]\nseed = 7\n").unwrap();

    let output = pointfade(
        root.path(),
        &[
            "--grid",
            "16x8",
            "--transition-source",
            "scroll",
            "config",
            "show",
            "--json",
        ],
    );
    assert!(output.status.success(), "{output:?}");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["grid"]["width"], 16);
    assert_eq!(value["grid"]["height"], 8);
    assert_eq!(value["grid"]["seed"], 7);
    assert_eq!(value["transition"]["source"], "scroll");
}

#[test]
fn config_show_without_file_uses_defaults() {
    let root = TempDir::new().unwrap();
    let output = pointfade(root.path(), &["config", "show", "--json"]);
    assert!(output.status.success(), "{output:?}");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["grid"]["width"], 512);
    assert_eq!(value["transition"]["source"], "manual");
}

#[test]
fn invalid_config_is_rejected() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("pointfade.toml"),
        "[assets]\ntextures = [\"only-one.png\"]\n",
    )
    .unwrap();

    let output = pointfade(root.path(), &["config", "show"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("invalid configuration"), "{stderr}");
}

#[test]
fn missing_explicit_config_fails() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("absent.toml");
    let output = pointfade(
        root.path(),
        &["config", "show", "--config", missing.to_str().unwrap()],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("absent.toml"), "{stderr}");
}

#[test]
fn config_where_reports_environment_directory() {
    let root = TempDir::new().unwrap();
    let output = pointfade(root.path(), &["config", "where"]);
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    let expected = root.path().join("pointfade.toml");
    assert!(stdout.contains(&expected.display().to_string()), "{stdout}");
    assert!(stdout.contains("POINTFADE_CONFIG_DIR"), "{stdout}");
    assert!(stdout.contains("built-in defaults"), "{stdout}");
}

#[test]
fn oversized_grid_is_rejected() {
    let root = TempDir::new().unwrap();
    let output = pointfade(root.path(), &["--grid", "5000x5000", "config", "show"]);
    assert!(!output.status.success());

    fs::write(
        root.path().join("pointfade.toml"),
        "[grid]\nwidth = 4000000000\nheight = 4000000000\n",
    )
    .unwrap();
    let output = pointfade(root.path(), &["config", "show"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("at most 16777216"), "{stderr}");
}
