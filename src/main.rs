use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;

use emucleaner::adb::{self, locate, AdbClient, Device};
use emucleaner::avd::{AvdCleanTargets, AvdManager, VirtualDevice};
use emucleaner::cleaner::{self, CleanupOption, DeviceCleaner, DeviceCleanupSummary};
use emucleaner::cli::args::{AppsAction, Cli, Commands, CompletionShell, ConfigAction};
use emucleaner::cli::output;
use emucleaner::common::{logging, CleanerError, Config, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let _log_guard = logging::init(cli.verbose);

    let config = Config::load()?;
    let format = cli.format.map(Into::into).unwrap_or(config.output_format);
    let ctx = Ctx {
        quiet: cli.quiet,
        format,
        config,
    };

    match cli.command {
        Commands::Devices => cmd_devices(&ctx),

        Commands::Avds => cmd_avds(&ctx),

        Commands::AvdClean {
            ref names,
            snapshots,
            cache,
            all,
            yes,
        } => {
            let targets = AvdCleanTargets {
                snapshots: snapshots || all,
                cache: cache || all,
            };
            cmd_avd_clean(&ctx, names, targets, yes)
        }

        Commands::Options => cmd_options(&ctx),

        Commands::Clean {
            ref device,
            all_devices,
            ref only,
            max_risk,
            root,
            dry_run,
            yes,
        } => {
            let options = select_options(only.as_deref(), max_risk.into())?;
            cmd_clean(&ctx, device.as_deref(), all_devices, &options, root, dry_run, yes)
        }

        Commands::Apps { ref action } => cmd_apps(&ctx, action),

        Commands::Config { action } => cmd_config(action),

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let shell = match shell {
                CompletionShell::Bash => clap_complete::Shell::Bash,
                CompletionShell::Zsh => clap_complete::Shell::Zsh,
                CompletionShell::Fish => clap_complete::Shell::Fish,
            };
            clap_complete::generate(shell, &mut cmd, "emucleaner", &mut std::io::stdout());
            Ok(())
        }
    }
}

struct Ctx {
    quiet: bool,
    format: OutputFormat,
    config: Config,
}

impl Ctx {
    fn human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    fn show_progress(&self) -> bool {
        !self.quiet && self.human()
    }

    fn client(&self) -> AdbClient {
        AdbClient::from_config(&self.config)
    }

    /// Client for commands that cannot do anything without adb
    fn require_client(&self) -> Result<AdbClient> {
        if !locate::is_available(&self.config) {
            bail!(
                "adb not found. Install the Android SDK platform-tools or run \
                 'emucleaner config set adb_path <PATH>'"
            );
        }
        Ok(self.client())
    }
}

// ─── Devices ──────────────────────────────────────────────────────────────────

fn cmd_devices(ctx: &Ctx) -> Result<()> {
    let client = ctx.require_client()?;
    let devices = adb::list_devices(&client);

    match ctx.format {
        OutputFormat::Human => {
            let rows: Vec<(Device, Option<adb::StorageInfo>)> = devices
                .into_iter()
                .map(|d| {
                    let storage = client.for_device(&d.id).storage_info();
                    (d, Some(storage))
                })
                .collect();
            output::print_devices(&rows);
        }
        OutputFormat::Json => output::print_json(&devices)?,
        OutputFormat::Quiet => {
            for d in &devices {
                println!("{}  {}  {}", d.id, d.kind, d.model);
            }
        }
    }
    Ok(())
}

fn resolve_device(devices: &[Device], serial: Option<&str>) -> Result<Device> {
    match serial {
        Some(serial) => adb::find_device(devices, serial).cloned().ok_or_else(|| {
            CleanerError::DeviceUnavailable {
                serial: serial.to_string(),
            }
            .into()
        }),
        None => match devices {
            [] => bail!("No devices connected. Start an emulator or plug in a device."),
            [only] => Ok(only.clone()),
            many => bail!(
                "Multiple devices connected; choose one with --device ({})",
                many.iter().map(|d| d.id.as_str()).collect::<Vec<_>>().join(", ")
            ),
        },
    }
}

// ─── Virtual devices ──────────────────────────────────────────────────────────

fn cmd_avds(ctx: &Ctx) -> Result<()> {
    let manager = AvdManager::from_config(&ctx.config, ctx.client());
    let avds = manager.list_virtual_devices();

    match ctx.format {
        OutputFormat::Human => output::print_avds(&avds),
        OutputFormat::Json => output::print_json(&avds)?,
        OutputFormat::Quiet => {
            for avd in &avds {
                println!(
                    "{}  {}  {}",
                    avd.name,
                    avd.total_size_bytes,
                    if avd.is_running { "running" } else { "stopped" }
                );
            }
        }
    }
    Ok(())
}

fn cmd_avd_clean(ctx: &Ctx, names: &[String], targets: AvdCleanTargets, yes: bool) -> Result<()> {
    if !targets.snapshots && !targets.cache {
        bail!("Nothing to clean: pass --snapshots, --cache or --all");
    }

    let manager = AvdManager::from_config(&ctx.config, ctx.require_client()?);
    let avds = manager.list_virtual_devices();

    let selected: Vec<VirtualDevice> = if names.is_empty() {
        avds.into_iter().filter(|a| !a.is_running).collect()
    } else {
        names
            .iter()
            .map(|name| {
                avds.iter()
                    .find(|a| &a.name == name)
                    .cloned()
                    .with_context(|| format!("Virtual device '{}' not found", name))
            })
            .collect::<Result<_>>()?
    };

    if selected.is_empty() {
        if !ctx.quiet {
            println!("  {} No stopped virtual devices to clean", "✨");
        }
        return Ok(());
    }

    if !yes {
        let what = match (targets.snapshots, targets.cache) {
            (true, true) => "snapshots and cache images",
            (true, false) => "snapshots",
            _ => "cache images",
        };
        let names: Vec<&str> = selected.iter().map(|a| a.name.as_str()).collect();
        if !confirm(&format!("Delete {} of {}?", what, names.join(", ")))? {
            return Ok(());
        }
    }

    let reports = manager.clean_avds(&selected, targets);

    match ctx.format {
        OutputFormat::Human => output::print_avd_reports(&reports),
        OutputFormat::Json => output::print_json(&reports)?,
        OutputFormat::Quiet => {
            for r in &reports {
                println!("{}  {}  {}", r.name, r.success(), r.bytes_freed());
            }
        }
    }
    Ok(())
}

// ─── Clean ────────────────────────────────────────────────────────────────────

fn cmd_options(ctx: &Ctx) -> Result<()> {
    let options = cleaner::cleanup_options();
    match ctx.format {
        OutputFormat::Human => output::print_options(&options),
        OutputFormat::Json => output::print_json(&options)?,
        OutputFormat::Quiet => options.iter().for_each(|o| println!("{}", o.name)),
    }
    Ok(())
}

fn select_options(only: Option<&[String]>, max_risk: cleaner::RiskLevel) -> Result<Vec<CleanupOption>> {
    match only {
        Some(names) => names
            .iter()
            .map(|n| {
                cleaner::find_option(n)
                    .with_context(|| format!("Unknown cleanup action '{}'. See 'emucleaner options'.", n))
            })
            .collect(),
        None => Ok(cleaner::options_up_to(max_risk)),
    }
}

fn cmd_clean(
    ctx: &Ctx,
    serial: Option<&str>,
    all_devices: bool,
    options: &[CleanupOption],
    root: bool,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let client = ctx.require_client()?;
    let devices = adb::list_devices(&client);

    let targets = if all_devices {
        if devices.is_empty() {
            bail!("No devices connected. Start an emulator or plug in a device.");
        }
        devices
    } else {
        vec![resolve_device(&devices, serial)?]
    };

    if dry_run {
        for device in &targets {
            output::print_clean_plan(device, options);
        }
        return Ok(());
    }

    if !yes {
        let risky = options
            .iter()
            .filter(|o| o.risk_level == cleaner::RiskLevel::High)
            .count();
        let mut prompt = format!(
            "Run {} cleanup action(s) on {} device(s)?",
            options.len(),
            targets.len()
        );
        if risky > 0 {
            prompt = format!("{} {} of them are high risk.", prompt, risky);
        }
        if !confirm(&prompt)? {
            return Ok(());
        }
    }

    // Devices are cleaned one after another; each shares the adb server.
    let mut summaries: Vec<DeviceCleanupSummary> = Vec::new();
    for device in targets {
        let cleaner = DeviceCleaner::new(device, &client).with_config(&ctx.config);

        if root && !cleaner.enable_root() && ctx.show_progress() {
            println!(
                "  {} Root not available on {}; continuing without it",
                "⚠".yellow(),
                cleaner.device().id
            );
        }

        let before = cleaner.storage_info();
        let spinner = output::spinner(ctx.show_progress());
        let sink = |msg: &str| {
            if let Some(ref pb) = spinner {
                pb.set_message(msg.to_string());
            }
        };
        let results = cleaner.run_all_cleanups(options, Some(&sink));
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        let after = cleaner.storage_info();

        summaries.push(cleaner.summarize(results, Vec::new()).with_storage(before, after));
    }

    print_summaries(ctx, &summaries)
}

fn print_summaries(ctx: &Ctx, summaries: &[DeviceCleanupSummary]) -> Result<()> {
    match ctx.format {
        OutputFormat::Human => summaries.iter().for_each(output::print_summary),
        OutputFormat::Json => output::print_json(summaries)?,
        OutputFormat::Quiet => summaries.iter().for_each(output::print_summary_quiet),
    }
    Ok(())
}

// ─── Apps ─────────────────────────────────────────────────────────────────────

fn cmd_apps(ctx: &Ctx, action: &AppsAction) -> Result<()> {
    let client = ctx.require_client()?;
    let devices = adb::list_devices(&client);

    match action {
        AppsAction::List { device } => {
            let device = resolve_device(&devices, device.as_deref())?;
            let cleaner = DeviceCleaner::new(device, &client).with_config(&ctx.config);
            let apps = cleaner.get_installed_apps();

            match ctx.format {
                OutputFormat::Human => output::print_apps(cleaner.device(), &apps),
                OutputFormat::Json => output::print_json(&apps)?,
                OutputFormat::Quiet => apps.iter().for_each(|a| println!("{}", a.package)),
            }
            Ok(())
        }

        AppsAction::Remove {
            packages,
            device,
            yes,
        } => {
            let device = resolve_device(&devices, device.as_deref())?;
            if !yes
                && !confirm(&format!(
                    "Uninstall {} from {}?",
                    packages.join(", "),
                    device.display_name()
                ))?
            {
                return Ok(());
            }

            let cleaner = DeviceCleaner::new(device, &client).with_config(&ctx.config);
            let spinner = output::spinner(ctx.show_progress());
            let sink = |msg: &str| {
                if let Some(ref pb) = spinner {
                    pb.set_message(msg.to_string());
                }
            };
            let results = cleaner.uninstall_apps(packages, Some(&sink));
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            print_summaries(ctx, &[cleaner.summarize(Vec::new(), results)])
        }
    }
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
            println!("{} {}", "#".dimmed(), Config::config_path().display().to_string().dimmed());
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("  {} Configuration reset to defaults", "✓".green());
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("  {} {} = {}", "✓".green(), key, value);
        }
        ConfigAction::Init => {
            Config::init_dirs()?;
            if !Config::config_path().exists() {
                Config::default().save()?;
            }
            println!(
                "  {} Initialized {}",
                "✓".green(),
                Config::data_dir().display()
            );
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;

    print!("\n  {} {} [y/N] ", "❓", prompt);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    if input.trim().eq_ignore_ascii_case("y") {
        Ok(true)
    } else {
        println!("  {} Cancelled", "✗".red());
        Ok(false)
    }
}
