pub mod client;
pub mod devices;
pub mod locate;
pub mod runner;
pub mod storage;

pub use client::{parse_package_list, AdbClient};
pub use devices::{find_device, list_devices, Device, DeviceKind};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use storage::StorageInfo;
