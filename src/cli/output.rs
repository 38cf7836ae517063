use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

use crate::adb::devices::Device;
use crate::adb::storage::StorageInfo;
use crate::avd::{total_avd_stats, AvdCleanReport, AvdCleanResult, VirtualDevice};
use crate::cleaner::catalog::CleanupOption;
use crate::cleaner::engine::InstalledApp;
use crate::cleaner::summary::{DeviceCleanupSummary, UninstallResult};
use crate::common::format::{self, format_path, format_risk, format_size, format_size_colored};

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Spinner used as the progress sink while items run
pub fn spinner(enabled: bool) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

fn rule() {
    println!("{}", "─".repeat(60).dimmed());
}

// ─── Devices ──────────────────────────────────────────────────────────────────

/// Print connected devices, with storage when it was queried
pub fn print_devices(devices: &[(Device, Option<StorageInfo>)]) {
    println!();
    println!("{}  Connected Devices", "📱");
    rule();

    if devices.is_empty() {
        println!("  {} No devices connected. Start an emulator or plug in a device.", "ℹ️");
        println!();
        return;
    }

    for (device, storage) in devices {
        println!("  {}", device.display_name().bold());
        format::print_kv("Serial", &device.id);
        format::print_kv("Type", &device.kind.to_string());
        if let Some(info) = storage {
            format::print_kv(
                "Storage (/data)",
                &format!(
                    "{} used of {} ({} free, {})",
                    info.used, info.total, info.available, info.use_percent
                ),
            );
        }
        println!();
    }
}

// ─── Virtual devices ──────────────────────────────────────────────────────────

pub fn print_avds(avds: &[VirtualDevice]) {
    println!();
    println!("{}  Virtual Devices", "💾");
    rule();

    if avds.is_empty() {
        println!("  {} No virtual devices found.", "ℹ️");
        println!();
        return;
    }

    for avd in avds {
        println!("  {}  {}", avd.display_name().bold(), avd.status_text());
        format::print_kv("Path", &format_path(&avd.path));
        format::print_kv(
            "Snapshots",
            &format_size_colored(avd.snapshot_size_bytes).to_string(),
        );
        format::print_kv("Cache", &format_size_colored(avd.cache_size_bytes).to_string());
        println!();
    }

    let (total, snapshots) = total_avd_stats(avds);
    rule();
    println!(
        "  {} Total: {}  •  Snapshots: {}",
        "💾",
        format_size_colored(total),
        format_size_colored(snapshots)
    );
    println!();
}

pub fn print_avd_reports(reports: &[AvdCleanReport]) {
    println!();
    for report in reports {
        println!("  {}", report.name.bold());
        if let Some(ref r) = report.snapshots {
            print_avd_result("Snapshots", r);
        }
        if let Some(ref r) = report.cache {
            print_avd_result("Cache", r);
        }
    }

    let freed: u64 = reports.iter().map(|r| r.bytes_freed()).sum();
    println!();
    println!("  {} Freed {}", "✓".green(), format_size_colored(freed));
    println!();
}

fn print_avd_result(label: &str, result: &AvdCleanResult) {
    let mark = if result.success { "✓".green() } else { "✗".red() };
    println!("    {} {}: {}", mark, label, result.message);
}

// ─── Catalog ──────────────────────────────────────────────────────────────────

pub fn print_options(options: &[CleanupOption]) {
    println!();
    println!("{}  Cleanup Actions", "🧹");
    rule();
    for option in options {
        println!(
            "  {} {} {}  [{}]",
            option.risk_level.indicator(),
            option.icon,
            option.name.bold(),
            format_risk(option.risk_level)
        );
        println!("      {}", option.description.dimmed());
        println!("      {} {}", "→".dimmed(), option.path.dimmed());
    }
    println!();
}

pub fn print_clean_plan(device: &Device, options: &[CleanupOption]) {
    println!();
    println!("  {} Dry run for {}", "ℹ️", device.display_name().bold());
    for option in options {
        println!(
            "    {} {}  {}",
            option.risk_level.indicator(),
            option.name,
            option.command.dimmed()
        );
    }
    println!();
}

// ─── Results ──────────────────────────────────────────────────────────────────

pub fn print_summary(summary: &DeviceCleanupSummary) {
    println!();
    println!("{}  {}", "🧹", summary.device.display_name().bold());
    rule();

    for result in &summary.cleanup_results {
        let mark = if result.success { "✓".green() } else { "✗".red() };
        println!("  {} {} {}", mark, result.option.icon, result.option.name);
        if !result.success && !result.output.is_empty() {
            println!("      {}", format::truncate(&result.output, 70).dimmed());
        }
    }
    for result in &summary.uninstall_results {
        print_uninstall_line(result);
    }

    rule();
    if !summary.cleanup_results.is_empty() {
        println!(
            "  Cleanups: {} succeeded, {} failed",
            summary.successful_cleanups().to_string().green(),
            summary.failed_cleanups().to_string().red()
        );
    }
    if !summary.uninstall_results.is_empty() {
        println!(
            "  Uninstalls: {} succeeded, {} failed",
            summary.successful_uninstalls().to_string().green(),
            summary.failed_uninstalls().to_string().red()
        );
    }
    if summary.bytes_freed() > 0 {
        println!("  Freed: {}", format_size_colored(summary.bytes_freed()));
    }
    if let (Some(before), Some(after)) = (&summary.storage_before, &summary.storage_after) {
        if before.is_known() && after.is_known() {
            println!(
                "  Storage: {} free ({}) → {} free ({})",
                before.available, before.use_percent, after.available.green(), after.use_percent
            );
        }
    }
    println!();
}

pub fn print_summary_quiet(summary: &DeviceCleanupSummary) {
    println!(
        "{}  {}/{}  {}/{}  {}",
        summary.device.id,
        summary.successful_cleanups(),
        summary.cleanup_results.len(),
        summary.successful_uninstalls(),
        summary.uninstall_results.len(),
        format_size(summary.bytes_freed())
    );
}

fn print_uninstall_line(result: &UninstallResult) {
    let mark = if result.success { "✓".green() } else { "✗".red() };
    println!("  {} {}", mark, result.package);
    if !result.success && !result.output.is_empty() {
        println!("      {}", format::truncate(&result.output, 70).dimmed());
    }
}

// ─── Apps ─────────────────────────────────────────────────────────────────────

pub fn print_apps(device: &Device, apps: &[InstalledApp]) {
    println!();
    println!("{}  Apps on {}", "📦", device.display_name().bold());
    rule();
    if apps.is_empty() {
        println!("  {} No user-installed apps.", "ℹ️");
    }
    for app in apps {
        println!("  {:<24} {}", app.name.bold(), app.package.dimmed());
    }
    println!();
    println!("  {} apps", apps.len());
    println!();
}
