use clap::{Parser, Subcommand, ValueEnum};

use crate::cleaner::catalog::RiskLevel;
use crate::common::config;

/// emucleaner — inventory and clean Android emulators and devices
#[derive(Parser, Debug)]
#[command(
    name = "emucleaner",
    version,
    about = "Clean Android emulators, virtual devices and connected devices over adb",
    long_about = "emucleaner lists connected devices and on-disk virtual devices, then clears\n\
                  app caches, temp files, logs, snapshots and unwanted apps. Running emulators\n\
                  are never modified on disk.",
    after_help = "EXAMPLES:\n  \
        emucleaner devices                          List connected devices\n  \
        emucleaner avds                             List virtual devices and sizes\n  \
        emucleaner avd-clean Pixel_6_API_34 --all   Remove snapshots and cache images\n  \
        emucleaner options                          Show available cleanup actions\n  \
        emucleaner clean --max-risk low             Run all low-risk actions\n  \
        emucleaner clean --only \"Temp Files\" --root  Clean temp files as root\n  \
        emucleaner apps list                        List user-installed apps\n  \
        emucleaner apps remove com.example.app      Uninstall an app"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (defaults to the configured format)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode — minimal output
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List connected devices and emulators
    Devices,

    /// List virtual devices with their disk usage
    Avds,

    /// Remove snapshots and/or cache images of stopped virtual devices
    AvdClean {
        /// Virtual device names (all stopped AVDs when omitted)
        names: Vec<String>,

        /// Delete saved snapshots
        #[arg(long)]
        snapshots: bool,

        /// Delete cache images
        #[arg(long)]
        cache: bool,

        /// Delete both snapshots and cache images
        #[arg(long)]
        all: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show the available cleanup actions
    Options,

    /// Run cleanup actions on a device
    Clean {
        /// Target device serial (defaults to the only connected device)
        #[arg(long, short = 'd', conflicts_with = "all_devices")]
        device: Option<String>,

        /// Clean every connected device
        #[arg(long)]
        all_devices: bool,

        /// Only run these actions (by name)
        #[arg(long, value_delimiter = ',')]
        only: Option<Vec<String>>,

        /// Highest risk level to include
        #[arg(long, default_value = "low")]
        max_risk: RiskFilter,

        /// Enable root first (emulators only)
        #[arg(long)]
        root: bool,

        /// Show what would run without running it
        #[arg(long)]
        dry_run: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// List and uninstall apps
    Apps {
        #[command(subcommand)]
        action: AppsAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug)]
pub enum AppsAction {
    /// List user-installed apps
    List {
        /// Target device serial
        #[arg(long, short = 'd')]
        device: Option<String>,
    },

    /// Uninstall one or more apps
    Remove {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,

        /// Target device serial
        #[arg(long, short = 'd')]
        device: Option<String>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset to default configuration
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Initialize emucleaner directories and default config
    Init,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}

impl From<OutputFormat> for config::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => config::OutputFormat::Human,
            OutputFormat::Json => config::OutputFormat::Json,
            OutputFormat::Quiet => config::OutputFormat::Quiet,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RiskFilter {
    Low,
    Medium,
    High,
}

impl From<RiskFilter> for RiskLevel {
    fn from(filter: RiskFilter) -> Self {
        match filter {
            RiskFilter::Low => RiskLevel::Low,
            RiskFilter::Medium => RiskLevel::Medium,
            RiskFilter::High => RiskLevel::High,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
