use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Binary with HOME pointed at a scratch directory
fn emucleaner(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("emucleaner").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("ANDROID_AVD_HOME")
        .env_remove("ANDROID_HOME")
        .env_remove("ANDROID_SDK_ROOT")
        .env("NO_COLOR", "1");
    cmd
}

fn write_config(home: &TempDir, contents: &str) {
    let dir = home.path().join(".emucleaner");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), contents).unwrap();
}

// ─── Help & version ──────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    emucleaner(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("devices"))
        .stdout(predicate::str::contains("avds"))
        .stdout(predicate::str::contains("avd-clean"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("apps"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    emucleaner(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("emucleaner"));
}

// ─── Options ─────────────────────────────────────────────────────────────────

#[test]
fn test_options_lists_catalog() {
    let home = TempDir::new().unwrap();
    emucleaner(&home)
        .arg("options")
        .assert()
        .success()
        .stdout(predicate::str::contains("App Caches"))
        .stdout(predicate::str::contains("Downloads"));
}

#[test]
fn test_options_json() {
    let home = TempDir::new().unwrap();
    let output = emucleaner(&home)
        .args(["options", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let options = value.as_array().unwrap();
    assert_eq!(options.len(), 7);
    assert_eq!(options[0]["name"], "App Caches");
}

// ─── Virtual devices ─────────────────────────────────────────────────────────

#[test]
fn test_avds_json_from_avd_home() {
    let home = TempDir::new().unwrap();
    let avd_home = home.path().join("avd");
    let avd_dir = avd_home.join("Pixel_6_API_34.avd");
    fs::create_dir_all(avd_dir.join("snapshots/default_boot")).unwrap();
    fs::write(avd_dir.join("snapshots/default_boot/ram.bin"), vec![0u8; 1000]).unwrap();
    fs::write(avd_home.join("Pixel_6_API_34.ini"), "target=android-34\n").unwrap();
    write_config(&home, "adb_path = \"/nonexistent/adb\"\n");

    let output = emucleaner(&home)
        .env("ANDROID_AVD_HOME", &avd_home)
        .args(["avds", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["name"], "Pixel_6_API_34");
    assert_eq!(value[0]["snapshot_size_bytes"], 1000);
    assert_eq!(value[0]["is_running"], false);
}

#[test]
fn test_avd_clean_requires_target() {
    let home = TempDir::new().unwrap();
    emucleaner(&home)
        .args(["avd-clean", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to clean"));
}

#[test]
fn test_avd_clean_without_adb_leaves_files() {
    let home = TempDir::new().unwrap();
    let avd_home = home.path().join("avd");
    let avd_dir = avd_home.join("Old.avd");
    fs::create_dir_all(avd_dir.join("snapshots/s1")).unwrap();
    fs::write(avd_dir.join("snapshots/s1/ram.bin"), vec![0u8; 64]).unwrap();
    fs::write(avd_home.join("Old.ini"), "").unwrap();
    write_config(&home, "adb_path = \"/nonexistent/adb\"\n");

    emucleaner(&home)
        .env("ANDROID_AVD_HOME", &avd_home)
        .env("PATH", "")
        .args(["avd-clean", "Old", "--snapshots", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("adb not found"));

    assert!(avd_dir.join("snapshots/s1/ram.bin").exists());
}

#[test]
fn test_zero_timeout_config_is_rejected() {
    let home = TempDir::new().unwrap();
    write_config(&home, "command_timeout_secs = 0\n");

    emucleaner(&home)
        .arg("options")
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

// ─── Devices ─────────────────────────────────────────────────────────────────

#[test]
fn test_devices_without_adb_fails() {
    let home = TempDir::new().unwrap();
    write_config(&home, "adb_path = \"/nonexistent/adb\"\n");

    emucleaner(&home)
        .env("PATH", "")
        .arg("devices")
        .assert()
        .failure()
        .stderr(predicate::str::contains("adb not found"));
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_defaults() {
    let home = TempDir::new().unwrap();
    emucleaner(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("command_timeout_secs = 30"));
}

#[test]
fn test_config_set_persists() {
    let home = TempDir::new().unwrap();
    emucleaner(&home)
        .args(["config", "set", "command_timeout_secs", "45"])
        .assert()
        .success();

    emucleaner(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("command_timeout_secs = 45"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let home = TempDir::new().unwrap();
    emucleaner(&home)
        .args(["config", "set", "no_such_key", "1"])
        .assert()
        .failure();
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    emucleaner(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("emucleaner"));
}
