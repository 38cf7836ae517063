use std::path::PathBuf;

use crate::common::config::Config;

const ADB: &str = "adb";

/// Pick the adb executable to run.
///
/// Order: configured path, `adb` on PATH, then the platform-tools directory
/// of `$ANDROID_HOME` or `$ANDROID_SDK_ROOT`. Falls back to the bare name so
/// the failure surfaces as an ordinary command error.
pub fn resolve_adb(config: &Config) -> String {
    if let Some(path) = config.adb_path.as_deref().filter(|p| !p.is_empty()) {
        return path.to_string();
    }
    find_adb()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ADB.to_string())
}

/// Locate adb without consulting the config file
pub fn find_adb() -> Option<PathBuf> {
    if let Ok(path) = which::which(ADB) {
        return Some(path);
    }
    sdk_platform_tools()
        .into_iter()
        .map(|dir| dir.join(adb_file_name()))
        .find(|p| p.is_file())
}

/// Whether an adb executable can be found for `config`
pub fn is_available(config: &Config) -> bool {
    match config.adb_path.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => which::which(path).is_ok() || std::path::Path::new(path).is_file(),
        None => find_adb().is_some(),
    }
}

fn sdk_platform_tools() -> Vec<PathBuf> {
    ["ANDROID_HOME", "ANDROID_SDK_ROOT"]
        .iter()
        .filter_map(|var| std::env::var_os(var))
        .map(|root| PathBuf::from(root).join("platform-tools"))
        .collect()
}

fn adb_file_name() -> &'static str {
    if cfg!(windows) {
        "adb.exe"
    } else {
        ADB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_path_wins() {
        let mut config = Config::default();
        config.adb_path = Some("/opt/android/platform-tools/adb".to_string());
        assert_eq!(resolve_adb(&config), "/opt/android/platform-tools/adb");
    }

    #[test]
    fn test_empty_configured_path_is_ignored() {
        let mut config = Config::default();
        config.adb_path = Some(String::new());
        assert!(!resolve_adb(&config).is_empty());
    }

    #[test]
    fn test_missing_configured_path_is_unavailable() {
        let mut config = Config::default();
        config.adb_path = Some("/nonexistent/emucleaner/adb".to_string());
        assert!(!is_available(&config));
    }
}
