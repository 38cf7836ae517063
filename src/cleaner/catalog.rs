use serde::{Deserialize, Serialize};

// ─── Core types ───────────────────────────────────────────────────────────────

/// How much damage a cleanup action can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Caches and temp files the system recreates
    Low,
    /// Logs and crash data; lost for debugging, harmless otherwise
    Medium,
    /// User content such as downloads
    High,
}

impl RiskLevel {
    /// Terminal color name used when rendering this level
    pub fn color(self) -> &'static str {
        match self {
            RiskLevel::Low => "green",
            RiskLevel::Medium => "yellow",
            RiskLevel::High => "red",
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            RiskLevel::Low => "🟢",
            RiskLevel::Medium => "🟡",
            RiskLevel::High => "🔴",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// What kind of device data a cleanup action removes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupCategory {
    AppCaches,
    TempFiles,
    Downloads,
    Logs,
    CrashReports,
    Thumbnails,
}

impl std::fmt::Display for CleanupCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupCategory::AppCaches => write!(f, "App Caches"),
            CleanupCategory::TempFiles => write!(f, "Temporary Files"),
            CleanupCategory::Downloads => write!(f, "Downloads"),
            CleanupCategory::Logs => write!(f, "Logs"),
            CleanupCategory::CrashReports => write!(f, "Crash Reports"),
            CleanupCategory::Thumbnails => write!(f, "Thumbnails"),
        }
    }
}

/// One cleanup action that can be run against a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupOption {
    pub category: CleanupCategory,
    pub name: String,
    pub description: String,
    /// Command template, run through the bridge client
    pub command: String,
    /// Device path the command clears
    pub path: String,
    pub icon: String,
    pub risk_level: RiskLevel,
}

struct CatalogEntry {
    category: CleanupCategory,
    name: &'static str,
    description: &'static str,
    command: &'static str,
    path: &'static str,
    icon: &'static str,
    risk_level: RiskLevel,
}

// ─── Catalog ──────────────────────────────────────────────────────────────────

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        category: CleanupCategory::AppCaches,
        name: "App Caches",
        description: "Trim cached data of all installed apps",
        command: "adb shell pm trim-caches 999999999999999",
        path: "/data/data/*/cache",
        icon: "🗑️",
        risk_level: RiskLevel::Low,
    },
    CatalogEntry {
        category: CleanupCategory::AppCaches,
        name: "Code Caches",
        description: "Compiled code caches, rebuilt on next launch",
        command: "adb shell rm -rf /data/data/*/code_cache/*",
        path: "/data/data/*/code_cache",
        icon: "⚙️",
        risk_level: RiskLevel::Low,
    },
    CatalogEntry {
        category: CleanupCategory::TempFiles,
        name: "Temp Files",
        description: "Files pushed to the shared temporary directory",
        command: "adb shell rm -rf /data/local/tmp/*",
        path: "/data/local/tmp",
        icon: "📁",
        risk_level: RiskLevel::Low,
    },
    CatalogEntry {
        category: CleanupCategory::Thumbnails,
        name: "Thumbnails",
        description: "Gallery thumbnail cache, regenerated on demand",
        command: "adb shell rm -rf /sdcard/DCIM/.thumbnails/*",
        path: "/sdcard/DCIM/.thumbnails",
        icon: "🖼️",
        risk_level: RiskLevel::Low,
    },
    CatalogEntry {
        category: CleanupCategory::Logs,
        name: "Logcat Buffers",
        description: "Clear the in-memory logcat ring buffers",
        command: "adb logcat -b all -c",
        path: "logcat",
        icon: "📜",
        risk_level: RiskLevel::Medium,
    },
    CatalogEntry {
        category: CleanupCategory::CrashReports,
        name: "Tombstones & ANR Traces",
        description: "Native crash dumps and app-not-responding traces",
        command: "adb shell rm -rf /data/tombstones/* /data/anr/*",
        path: "/data/tombstones",
        icon: "💥",
        risk_level: RiskLevel::Medium,
    },
    CatalogEntry {
        category: CleanupCategory::Downloads,
        name: "Downloads",
        description: "Everything in the shared Download folder",
        command: "adb shell rm -rf /sdcard/Download/*",
        path: "/sdcard/Download",
        icon: "📥",
        risk_level: RiskLevel::High,
    },
];

impl From<&CatalogEntry> for CleanupOption {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            category: entry.category,
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            command: entry.command.to_string(),
            path: entry.path.to_string(),
            icon: entry.icon.to_string(),
            risk_level: entry.risk_level,
        }
    }
}

/// The full catalog, in display order.
///
/// Each call builds a fresh list, so callers may filter or edit it freely.
pub fn cleanup_options() -> Vec<CleanupOption> {
    CATALOG.iter().map(CleanupOption::from).collect()
}

/// Catalog entries at or below `max_risk`
pub fn options_up_to(max_risk: RiskLevel) -> Vec<CleanupOption> {
    cleanup_options()
        .into_iter()
        .filter(|o| o.risk_level <= max_risk)
        .collect()
}

/// Find a catalog entry by name (case-insensitive)
pub fn find_option(name: &str) -> Option<CleanupOption> {
    CATALOG
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
        .map(CleanupOption::from)
}
