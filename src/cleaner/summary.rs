use serde::{Deserialize, Serialize};

use super::catalog::CleanupOption;
use crate::adb::devices::Device;
use crate::adb::storage::StorageInfo;

/// Outcome of one cleanup action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupResult {
    pub option: CleanupOption,
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_freed: Option<u64>,
}

/// Outcome of one package uninstall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UninstallResult {
    pub package: String,
    pub success: bool,
    pub output: String,
}

/// Everything done to one device in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCleanupSummary {
    pub device: Device,
    pub cleanup_results: Vec<CleanupResult>,
    pub uninstall_results: Vec<UninstallResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_before: Option<StorageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_after: Option<StorageInfo>,
}

impl DeviceCleanupSummary {
    pub fn successful_cleanups(&self) -> usize {
        self.cleanup_results.iter().filter(|r| r.success).count()
    }

    pub fn failed_cleanups(&self) -> usize {
        self.cleanup_results.len() - self.successful_cleanups()
    }

    pub fn successful_uninstalls(&self) -> usize {
        self.uninstall_results.iter().filter(|r| r.success).count()
    }

    pub fn failed_uninstalls(&self) -> usize {
        self.uninstall_results.len() - self.successful_uninstalls()
    }

    /// Bytes freed by the actions that reported a figure
    pub fn bytes_freed(&self) -> u64 {
        self.cleanup_results.iter().filter_map(|r| r.bytes_freed).sum()
    }

    /// Attach storage readings taken around the run
    pub fn with_storage(mut self, before: StorageInfo, after: StorageInfo) -> Self {
        self.storage_before = Some(before);
        self.storage_after = Some(after);
        self
    }
}

/// Fold a device's results into its summary
pub fn summarize(
    device: Device,
    cleanup_results: Vec<CleanupResult>,
    uninstall_results: Vec<UninstallResult>,
) -> DeviceCleanupSummary {
    DeviceCleanupSummary {
        device,
        cleanup_results,
        uninstall_results,
        storage_before: None,
        storage_after: None,
    }
}
