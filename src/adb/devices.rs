use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::AdbClient;

/// Serial prefix adb gives to emulator instances
pub const EMULATOR_PREFIX: &str = "emulator";

/// Connection state adb reports for a usable device
pub const READY_STATE: &str = "device";

/// Whether a device is an emulator or real hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Emulator,
    Physical,
}

impl DeviceKind {
    /// Classify by serial naming convention; the only place kind is decided
    pub fn from_serial(serial: &str) -> Self {
        if serial.starts_with(EMULATOR_PREFIX) {
            DeviceKind::Emulator
        } else {
            DeviceKind::Physical
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Emulator => write!(f, "Emulator"),
            DeviceKind::Physical => write!(f, "Physical"),
        }
    }
}

/// Snapshot of a connected device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub status: String,
    pub kind: DeviceKind,
    pub model: String,
    pub os_version: String,
    pub sdk_version: String,
}

impl Device {
    pub fn is_emulator(&self) -> bool {
        self.kind == DeviceKind::Emulator
    }

    /// One-line label such as "📱 sdk_gphone64_arm64 (Android 14, API 34)"
    pub fn display_name(&self) -> String {
        let icon = match self.kind {
            DeviceKind::Emulator => "📱",
            DeviceKind::Physical => "🔌",
        };
        format!(
            "{} {} (Android {}, API {})",
            icon, self.model, self.os_version, self.sdk_version
        )
    }
}

/// One row of `adb devices` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLine {
    pub serial: String,
    pub state: String,
}

/// Parse `adb devices [-l]` output into its rows.
///
/// The header line is skipped, as are blank and malformed rows. Rows are kept
/// whatever their state; callers filter on [`READY_STATE`].
pub fn parse_device_lines(output: &str) -> Vec<DeviceLine> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next()?;
            Some(DeviceLine {
                serial: serial.to_string(),
                state: state.to_string(),
            })
        })
        .collect()
}

/// Serials of connected devices that are ready to accept commands
pub fn ready_serials(output: &str) -> Vec<String> {
    parse_device_lines(output)
        .into_iter()
        .filter(|line| line.state == READY_STATE)
        .map(|line| line.serial)
        .collect()
}

/// List connected devices with their model and Android version.
///
/// Returns an empty list when adb itself fails.
pub fn list_devices(client: &AdbClient) -> Vec<Device> {
    let (success, output) = client.run_command("adb devices -l");
    if !success {
        debug!(output = %output, "adb devices failed");
        return Vec::new();
    }

    ready_serials(&output)
        .into_iter()
        .map(|serial| {
            let device_client = client.for_device(&serial);
            Device {
                kind: DeviceKind::from_serial(&serial),
                status: READY_STATE.to_string(),
                model: device_client.get_property("ro.product.model"),
                os_version: device_client.get_property("ro.build.version.release"),
                sdk_version: device_client.get_property("ro.build.version.sdk"),
                id: serial,
            }
        })
        .collect()
}

/// Find a connected device by serial
pub fn find_device<'a>(devices: &'a [Device], serial: &str) -> Option<&'a Device> {
    devices.iter().find(|d| d.id == serial)
}
