use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::locate;
use super::runner::{CommandRunner, SystemRunner};
use super::storage::StorageInfo;
use crate::common::config::{Config, DEFAULT_TIMEOUT_SECS};

/// Substring that makes a failed command count as done (uninstalling an
/// absent package). Matched case-insensitively over free-form bridge output.
const NOT_INSTALLED: &str = "not installed";

/// Client for executing adb commands, optionally bound to one device.
///
/// Every operation returns `(success, output)` instead of an error so batch
/// callers can keep going after a failed item.
#[derive(Clone)]
pub struct AdbClient {
    runner: Arc<dyn CommandRunner>,
    program: String,
    timeout: Duration,
    root_settle: Duration,
    device_id: Option<String>,
}

impl fmt::Debug for AdbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdbClient")
            .field("program", &self.program)
            .field("timeout", &self.timeout)
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

impl AdbClient {
    /// Create an unbound client that runs `program` through `runner`
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            root_settle: Duration::from_secs(1),
            device_id: None,
        }
    }

    /// Create a client for the real adb executable described by `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(SystemRunner), locate::resolve_adb(config))
            .with_timeout(config.command_timeout())
            .with_root_settle(config.root_settle())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_root_settle(mut self, settle: Duration) -> Self {
        self.root_settle = settle;
        self
    }

    /// A copy of this client bound to `device_id`
    pub fn for_device(&self, device_id: &str) -> Self {
        let mut client = self.clone();
        client.device_id = Some(device_id.to_string());
        client
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Execute a command with the default timeout and the bound device
    pub fn run_command(&self, command: &str) -> (bool, String) {
        self.run_command_with(command, self.timeout, None)
    }

    /// Execute a command.
    ///
    /// Commands written as `adb ...` run through the configured executable,
    /// with `-s <device>` inserted when `device_id` or the bound device is set.
    pub fn run_command_with(
        &self,
        command: &str,
        timeout: Duration,
        device_id: Option<&str>,
    ) -> (bool, String) {
        let target = device_id.or(self.device_id.as_deref());
        let Some((program, args)) = self.build_invocation(command, target) else {
            return (false, "Empty command".to_string());
        };

        match self.runner.run(&program, &args, timeout) {
            Ok(output) => {
                let text = output.text();
                let success = output.success || text.to_lowercase().contains(NOT_INSTALLED);
                (success, text)
            }
            Err(e) => {
                warn!(command = %command, error = %e, "bridge command failed");
                (false, e.to_string())
            }
        }
    }

    /// Split a command template into the program to spawn and its arguments
    pub fn build_invocation(&self, command: &str, target: Option<&str>) -> Option<(String, Vec<String>)> {
        let mut tokens = command.split_whitespace();
        let first = tokens.next()?;

        if first == "adb" {
            let mut args = Vec::new();
            if let Some(id) = target {
                args.push("-s".to_string());
                args.push(id.to_string());
            }
            args.extend(tokens.map(String::from));
            Some((self.program.clone(), args))
        } else {
            Some((first.to_string(), tokens.map(String::from).collect()))
        }
    }

    /// Execute a shell command on the device
    pub fn shell(&self, command: &str) -> (bool, String) {
        self.run_command(&format!("adb shell {}", command))
    }

    /// Read a system property, or "Unknown" when the query fails
    pub fn get_property(&self, prop: &str) -> String {
        let (success, output) = self.shell(&format!("getprop {}", prop));
        if success {
            output.trim().to_string()
        } else {
            "Unknown".to_string()
        }
    }

    /// Ask adbd to restart with root privileges.
    ///
    /// Only call this for emulators; the caller owns that decision.
    pub fn enable_root(&self) -> bool {
        let (success, output) = self.run_command("adb root");
        let lower = output.to_lowercase();

        if lower.contains("restarting adbd as root") {
            debug!(settle_ms = self.root_settle.as_millis() as u64, "waiting for adbd restart");
            thread::sleep(self.root_settle);
            return true;
        }

        success || lower.contains("already running as root")
    }

    /// Storage usage of the device's /data partition
    pub fn storage_info(&self) -> StorageInfo {
        let (success, output) = self.shell("df -h /data");
        if success && !output.is_empty() {
            StorageInfo::from_df_output(&output)
        } else {
            StorageInfo::default()
        }
    }

    /// Uninstall an application
    pub fn uninstall_package(&self, package: &str) -> (bool, String) {
        self.run_command(&format!("adb uninstall {}", package))
    }

    /// Sorted package names installed on the device
    pub fn list_packages(&self, third_party_only: bool) -> Vec<String> {
        let command = if third_party_only {
            "pm list packages -3"
        } else {
            "pm list packages"
        };
        let (success, output) = self.shell(command);
        if !success || output.is_empty() {
            return Vec::new();
        }

        let mut packages = parse_package_list(&output);
        packages.sort();
        packages
    }

    /// Name of the virtual device behind a running emulator serial
    pub fn emulator_avd_name(&self, serial: &str) -> Option<String> {
        let (success, output) = self.run_command_with("adb emu avd name", self.timeout, Some(serial));
        if !success {
            return None;
        }
        let name = output.lines().next()?.trim();
        if name.is_empty() || name == "OK" {
            None
        } else {
            Some(name.to_string())
        }
    }
}

/// Parse `pm list packages` output into package names, in output order
pub fn parse_package_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("package:"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}
