use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::catalog::CleanupOption;
use super::summary::{self, CleanupResult, DeviceCleanupSummary, UninstallResult};
use crate::adb::client::AdbClient;
use crate::adb::devices::Device;
use crate::adb::storage::StorageInfo;
use crate::common::config::Config;

/// Receives one human-readable status line per item
pub type Progress<'a> = Option<&'a dyn Fn(&str)>;

/// A user-installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledApp {
    pub package: String,
    /// Last dot-separated segment of the package id
    pub name: String,
}

impl InstalledApp {
    pub fn from_package(package: &str) -> Self {
        let name = package.rsplit('.').next().unwrap_or(package);
        Self {
            package: package.to_string(),
            name: name.to_string(),
        }
    }
}

/// Runs cleanup actions and uninstalls against one device.
///
/// Items are executed one at a time in the order given. A failing item is
/// recorded in its result and the batch moves on.
#[derive(Debug, Clone)]
pub struct DeviceCleaner {
    device: Device,
    client: AdbClient,
    third_party_only: bool,
    exclude_packages: Vec<String>,
}

impl DeviceCleaner {
    /// Bind a cleaner to `device`; `client` is re-targeted at its serial
    pub fn new(device: Device, client: &AdbClient) -> Self {
        let client = client.for_device(&device.id);
        Self {
            device,
            client,
            third_party_only: true,
            exclude_packages: Vec::new(),
        }
    }

    /// Apply the package-listing preferences from `config`
    pub fn with_config(mut self, config: &Config) -> Self {
        self.third_party_only = config.third_party_only;
        self.exclude_packages = config.exclude_packages.clone();
        self
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn client(&self) -> &AdbClient {
        &self.client
    }

    /// Restart adbd as root. Physical devices are never touched and get `false`.
    pub fn enable_root(&self) -> bool {
        if !self.device.is_emulator() {
            debug!(device = %self.device.id, "root not attempted on physical device");
            return false;
        }
        self.client.enable_root()
    }

    pub fn storage_info(&self) -> StorageInfo {
        self.client.storage_info()
    }

    /// Run one cleanup action, reporting it to `progress` exactly once
    pub fn run_cleanup(&self, option: &CleanupOption, progress: Progress<'_>) -> CleanupResult {
        notify(progress, &format!("Running {}...", option.name));

        let (success, output) = self.client.run_command(&option.command);
        info!(device = %self.device.id, action = %option.name, success, "cleanup finished");

        CleanupResult {
            option: option.clone(),
            success,
            output,
            bytes_freed: None,
        }
    }

    /// Run every option in order; results line up with `options`
    pub fn run_all_cleanups(&self, options: &[CleanupOption], progress: Progress<'_>) -> Vec<CleanupResult> {
        options
            .iter()
            .map(|option| self.run_cleanup(option, progress))
            .collect()
    }

    /// User-installed apps, minus configured exclusions
    pub fn get_installed_apps(&self) -> Vec<InstalledApp> {
        self.client
            .list_packages(self.third_party_only)
            .iter()
            .filter(|p| !self.exclude_packages.iter().any(|x| p.contains(x.as_str())))
            .map(|p| InstalledApp::from_package(p))
            .collect()
    }

    /// Uninstall one package, reporting it to `progress` exactly once.
    /// An already-absent package counts as success.
    pub fn uninstall_app(&self, package: &str, progress: Progress<'_>) -> UninstallResult {
        notify(progress, &format!("Uninstalling {}...", package));

        let (success, output) = self.client.uninstall_package(package);
        info!(device = %self.device.id, package = %package, success, "uninstall finished");

        UninstallResult {
            package: package.to_string(),
            success,
            output,
        }
    }

    /// Uninstall packages in order, reporting each to `progress` once
    pub fn uninstall_apps<S: AsRef<str>>(&self, packages: &[S], progress: Progress<'_>) -> Vec<UninstallResult> {
        packages
            .iter()
            .map(|package| self.uninstall_app(package.as_ref(), progress))
            .collect()
    }

    /// Summary of this device's results
    pub fn summarize(
        &self,
        cleanup_results: Vec<CleanupResult>,
        uninstall_results: Vec<UninstallResult>,
    ) -> DeviceCleanupSummary {
        summary::summarize(self.device.clone(), cleanup_results, uninstall_results)
    }
}

fn notify(progress: Progress<'_>, message: &str) {
    if let Some(sink) = progress {
        sink(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_name_is_last_segment() {
        let app = InstalledApp::from_package("com.example.app1");
        assert_eq!(app.package, "com.example.app1");
        assert_eq!(app.name, "app1");
        assert_eq!(InstalledApp::from_package("nodots").name, "nodots");
    }
}
