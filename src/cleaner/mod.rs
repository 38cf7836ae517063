pub mod catalog;
pub mod engine;
pub mod summary;

pub use catalog::{cleanup_options, find_option, options_up_to, CleanupCategory, CleanupOption, RiskLevel};
pub use engine::{DeviceCleaner, InstalledApp, Progress};
pub use summary::{summarize, CleanupResult, DeviceCleanupSummary, UninstallResult};
