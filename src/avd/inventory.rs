use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::cleaner::{self, AvdCleanReport, AvdCleanResult, AvdCleanTargets};
use crate::adb::client::AdbClient;
use crate::adb::devices::{parse_device_lines, DeviceKind};
use crate::common::config::Config;
use crate::common::errors::CleanerError;
use crate::common::format::format_size;

/// Subdirectory holding saved emulator states
pub const SNAPSHOTS_DIR: &str = "snapshots";

/// Cache partition images directly inside an AVD directory
pub const CACHE_PATTERN: &str = "cache.img*";

/// An Android Virtual Device found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualDevice {
    pub name: String,
    pub path: PathBuf,
    pub total_size_bytes: u64,
    pub snapshot_size_bytes: u64,
    pub cache_size_bytes: u64,
    pub is_running: bool,
}

impl VirtualDevice {
    pub fn snapshots_dir(&self) -> PathBuf {
        self.path.join(SNAPSHOTS_DIR)
    }

    pub fn status_text(&self) -> &'static str {
        if self.is_running {
            "🟢 RUNNING"
        } else {
            "⚫ stopped"
        }
    }

    pub fn display_name(&self) -> String {
        format!("💾 {} ({})", self.name, format_size(self.total_size_bytes))
    }
}

/// Total size in bytes of all files below `path`.
///
/// Entries that vanish or cannot be read while walking are skipped; a missing
/// path counts as empty.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Cache image files directly inside an AVD directory
pub fn cache_files(avd_dir: &Path) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&avd_dir.to_string_lossy()),
        CACHE_PATTERN
    );

    match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(|p| p.ok()).filter(|p| p.is_file()).collect(),
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "invalid cache pattern");
            Vec::new()
        }
    }
}

/// Combined size of the cache images in an AVD directory
pub fn cache_size(avd_dir: &Path) -> u64 {
    cache_files(avd_dir)
        .iter()
        .filter_map(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .sum()
}

/// Resolve the AVD home: config override, `$ANDROID_AVD_HOME`, then
/// `~/.android/avd`. Returns `None` when the directory does not exist.
pub fn avd_home(config: &Config) -> Option<PathBuf> {
    let home = config
        .avd_home
        .clone()
        .or_else(|| std::env::var_os("ANDROID_AVD_HOME").map(PathBuf::from))
        .or_else(|| dirs::home_dir().map(|h| h.join(".android").join("avd")))?;
    home.is_dir().then_some(home)
}

/// Names of the AVDs behind currently running emulators.
///
/// Lenient: a bridge failure or an emulator that will not report its name
/// is skipped. Use [`running_emulator_names_checked`] before deleting.
pub fn running_emulator_names(client: &AdbClient) -> Vec<String> {
    emulator_serials(client)
        .unwrap_or_default()
        .iter()
        .filter_map(|serial| client.emulator_avd_name(serial))
        .collect()
}

/// Names of the AVDs behind every emulator the bridge can see.
///
/// Emulators count whatever their state, so a booting (`offline`) instance
/// is still running. Fails when the bridge cannot list devices or an
/// emulator cannot be identified.
pub fn running_emulator_names_checked(client: &AdbClient) -> Result<Vec<String>, CleanerError> {
    emulator_serials(client)?
        .iter()
        .map(|serial| {
            client
                .emulator_avd_name(serial)
                .ok_or_else(|| CleanerError::ExecutionFault {
                    command: "adb emu avd name".to_string(),
                    message: format!("Could not identify emulator {}", serial),
                })
        })
        .collect()
}

/// Serials of all emulator rows in `adb devices`, in any state
fn emulator_serials(client: &AdbClient) -> Result<Vec<String>, CleanerError> {
    let (success, output) = client.run_command("adb devices");
    if !success {
        return Err(CleanerError::ExecutionFault {
            command: "adb devices".to_string(),
            message: output,
        });
    }

    Ok(parse_device_lines(&output)
        .into_iter()
        .filter(|line| DeviceKind::from_serial(&line.serial) == DeviceKind::Emulator)
        .map(|line| line.serial)
        .collect())
}

/// Reads and cleans the AVDs under one home directory.
///
/// Running state comes from the bridge, so every destructive call asks the
/// bridge again right before touching the disk.
#[derive(Debug, Clone)]
pub struct AvdManager {
    client: AdbClient,
    home: Option<PathBuf>,
}

impl AvdManager {
    /// `client` should not be bound to a device; it lists all emulators
    pub fn new(client: AdbClient, home: Option<PathBuf>) -> Self {
        Self { client, home }
    }

    pub fn from_config(config: &Config, client: AdbClient) -> Self {
        Self::new(client, avd_home(config))
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// All AVDs with their sizes and running state
    pub fn list_virtual_devices(&self) -> Vec<VirtualDevice> {
        let Some(home) = self.home.as_deref().filter(|h| h.is_dir()) else {
            return Vec::new();
        };

        let entries = definition_entries(home);
        let running = running_emulator_names(&self.client);

        // Size walks are read-only and independent per AVD.
        entries
            .into_par_iter()
            .map(|(name, path)| {
                let snapshots = path.join(SNAPSHOTS_DIR);
                VirtualDevice {
                    total_size_bytes: dir_size(&path),
                    snapshot_size_bytes: if snapshots.is_dir() { dir_size(&snapshots) } else { 0 },
                    cache_size_bytes: cache_size(&path),
                    is_running: running.contains(&name),
                    name,
                    path,
                }
            })
            .collect()
    }

    /// Ask the bridge whether the named AVD is running right now
    pub fn is_running(&self, name: &str) -> bool {
        running_emulator_names(&self.client).iter().any(|n| n == name)
    }

    /// Delete saved snapshots after re-checking that the AVD is stopped
    pub fn clean_snapshots(&self, avd: &VirtualDevice) -> AvdCleanResult {
        match self.verify_stopped(avd) {
            Ok(()) => cleaner::clean_snapshots(avd),
            Err(e) => AvdCleanResult::rejected(&e),
        }
    }

    /// Delete cache images after re-checking that the AVD is stopped
    pub fn clean_cache(&self, avd: &VirtualDevice) -> AvdCleanResult {
        match self.verify_stopped(avd) {
            Ok(()) => cleaner::clean_cache(avd),
            Err(e) => AvdCleanResult::rejected(&e),
        }
    }

    /// Clean several AVDs in order; one AVD failing never stops the rest
    pub fn clean_avds(&self, avds: &[VirtualDevice], targets: AvdCleanTargets) -> Vec<AvdCleanReport> {
        avds.iter()
            .map(|avd| AvdCleanReport {
                name: avd.name.clone(),
                snapshots: targets.snapshots.then(|| self.clean_snapshots(avd)),
                cache: targets.cache.then(|| self.clean_cache(avd)),
            })
            .collect()
    }

    fn verify_stopped(&self, avd: &VirtualDevice) -> Result<(), CleanerError> {
        if avd.is_running {
            warn!(avd = %avd.name, "refusing to clean running emulator");
            return Err(CleanerError::UnsafeOperation {
                name: avd.name.clone(),
            });
        }

        let running = running_emulator_names_checked(&self.client).map_err(|e| {
            warn!(avd = %avd.name, error = %e, "running state unknown, refusing to clean");
            CleanerError::ExecutionFault {
                command: "adb devices".to_string(),
                message: format!("Could not confirm '{}' is stopped: {}", avd.name, e),
            }
        })?;

        if running.contains(&avd.name) {
            warn!(avd = %avd.name, "refusing to clean running emulator");
            return Err(CleanerError::UnsafeOperation {
                name: avd.name.clone(),
            });
        }
        Ok(())
    }
}

/// `(name, image dir)` for each `<name>.ini` directly under `home`
fn definition_entries(home: &Path) -> Vec<(String, PathBuf)> {
    let Ok(read_dir) = std::fs::read_dir(home) else {
        return Vec::new();
    };

    let mut entries: Vec<(String, PathBuf)> = read_dir
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ini"))
        .filter_map(|ini| {
            let name = ini.file_stem()?.to_string_lossy().into_owned();
            match resolve_image_dir(home, &name, &ini) {
                Some(dir) => Some((name, dir)),
                None => {
                    debug!(avd = %name, "skipping definition without image directory");
                    None
                }
            }
        })
        .collect();

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

/// Sibling `<name>.avd`, else the `path=` entry of the definition file
fn resolve_image_dir(home: &Path, name: &str, ini: &Path) -> Option<PathBuf> {
    let sibling = home.join(format!("{}.avd", name));
    if sibling.is_dir() {
        return Some(sibling);
    }

    let contents = std::fs::read_to_string(ini).ok()?;
    contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("path="))
        .map(|p| PathBuf::from(p.trim()))
        .find(|p| p.is_dir())
}
