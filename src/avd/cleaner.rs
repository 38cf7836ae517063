use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use super::inventory::{cache_files, dir_size, VirtualDevice};
use crate::common::errors::CleanerError;
use crate::common::format::format_size;

/// Outcome of cleaning one part of an AVD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvdCleanResult {
    pub success: bool,
    pub message: String,
    pub bytes_freed: u64,
}

impl AvdCleanResult {
    fn freed(bytes: u64) -> Self {
        Self {
            success: true,
            message: format!("Freed {}", format_size(bytes)),
            bytes_freed: bytes,
        }
    }

    /// A failed result carrying the error text and nothing freed
    pub fn rejected(err: &CleanerError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            bytes_freed: 0,
        }
    }
}

/// Which parts of an AVD a batch clean touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AvdCleanTargets {
    pub snapshots: bool,
    pub cache: bool,
}

/// Per-AVD outcome of a batch clean
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvdCleanReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<AvdCleanResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<AvdCleanResult>,
}

impl AvdCleanReport {
    pub fn bytes_freed(&self) -> u64 {
        [&self.snapshots, &self.cache]
            .into_iter()
            .flatten()
            .map(|r| r.bytes_freed)
            .sum()
    }

    pub fn success(&self) -> bool {
        [&self.snapshots, &self.cache]
            .into_iter()
            .flatten()
            .all(|r| r.success)
    }
}

/// Empty the AVD's snapshots directory, keeping the directory itself.
///
/// Refused for a running AVD. Failures are reported in the result, never
/// raised.
pub fn clean_snapshots(avd: &VirtualDevice) -> AvdCleanResult {
    if avd.is_running {
        return refuse(avd);
    }

    let snapshot_dir = avd.snapshots_dir();
    if !snapshot_dir.exists() {
        return AvdCleanResult {
            success: true,
            message: "No snapshots found".to_string(),
            bytes_freed: 0,
        };
    }

    let size_before = dir_size(&snapshot_dir);
    match remove_children(&snapshot_dir) {
        Ok(()) => {
            info!(avd = %avd.name, bytes = size_before, "snapshots removed");
            AvdCleanResult::freed(size_before)
        }
        Err(e) => {
            warn!(avd = %avd.name, error = %e, "snapshot cleanup failed");
            AvdCleanResult::rejected(&e)
        }
    }
}

/// Delete the cache images of an AVD. Refused for a running AVD.
pub fn clean_cache(avd: &VirtualDevice) -> AvdCleanResult {
    if avd.is_running {
        return refuse(avd);
    }

    match remove_cache_files(&avd.path) {
        Ok(freed) => {
            info!(avd = %avd.name, bytes = freed, "cache images removed");
            AvdCleanResult::freed(freed)
        }
        Err(e) => {
            warn!(avd = %avd.name, error = %e, "cache cleanup failed");
            AvdCleanResult::rejected(&e)
        }
    }
}

/// Total on-disk size and snapshot size across `avds`
pub fn total_avd_stats(avds: &[VirtualDevice]) -> (u64, u64) {
    avds.iter().fold((0, 0), |(total, snaps), avd| {
        (total + avd.total_size_bytes, snaps + avd.snapshot_size_bytes)
    })
}

fn refuse(avd: &VirtualDevice) -> AvdCleanResult {
    warn!(avd = %avd.name, "refusing to clean running emulator");
    AvdCleanResult::rejected(&CleanerError::UnsafeOperation {
        name: avd.name.clone(),
    })
}

fn remove_children(dir: &Path) -> Result<(), CleanerError> {
    let entries = std::fs::read_dir(dir).map_err(|e| CleanerError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| CleanerError::io(dir, e))?.path();
        let result = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        result.map_err(|e| CleanerError::io(&path, e))?;
    }
    Ok(())
}

fn remove_cache_files(avd_dir: &Path) -> Result<u64, CleanerError> {
    let mut freed = 0;
    for file in cache_files(avd_dir) {
        let size = std::fs::metadata(&file)
            .map_err(|e| CleanerError::io(&file, e))?
            .len();
        std::fs::remove_file(&file).map_err(|e| CleanerError::io(&file, e))?;
        freed += size;
    }
    Ok(freed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn avd(name: &str, path: PathBuf, running: bool) -> VirtualDevice {
        VirtualDevice {
            name: name.to_string(),
            path,
            total_size_bytes: 100,
            snapshot_size_bytes: 40,
            cache_size_bytes: 0,
            is_running: running,
        }
    }

    #[test]
    fn test_running_avd_is_refused_without_touching_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let snapshots = tmp.path().join("snapshots");
        std::fs::create_dir(&snapshots).unwrap();
        std::fs::write(snapshots.join("snap.pb"), b"abc").unwrap();
        std::fs::write(tmp.path().join("cache.img"), b"abcd").unwrap();

        let running = avd("Pixel_7_API_34", tmp.path().to_path_buf(), true);
        for result in [clean_snapshots(&running), clean_cache(&running)] {
            assert!(!result.success);
            assert!(result.message.to_lowercase().contains("running"));
            assert_eq!(result.bytes_freed, 0);
        }
        assert!(snapshots.join("snap.pb").exists());
        assert!(tmp.path().join("cache.img").exists());
    }

    #[test]
    fn test_total_stats() {
        let avds = vec![
            avd("a", PathBuf::from("/a"), false),
            avd("b", PathBuf::from("/b"), true),
        ];
        assert_eq!(total_avd_stats(&avds), (200, 80));
        assert_eq!(total_avd_stats(&[]), (0, 0));
    }

    #[test]
    fn test_report_totals() {
        let report = AvdCleanReport {
            name: "a".to_string(),
            snapshots: Some(AvdCleanResult::freed(1000)),
            cache: Some(AvdCleanResult {
                success: false,
                message: "Permission denied".to_string(),
                bytes_freed: 0,
            }),
        };
        assert_eq!(report.bytes_freed(), 1000);
        assert!(!report.success());
    }
}
