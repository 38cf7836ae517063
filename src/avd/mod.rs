pub mod cleaner;
pub mod inventory;

pub use cleaner::{clean_cache, clean_snapshots, total_avd_stats, AvdCleanReport, AvdCleanResult, AvdCleanTargets};
pub use inventory::{
    avd_home, dir_size, running_emulator_names, running_emulator_names_checked, AvdManager, VirtualDevice,
};
