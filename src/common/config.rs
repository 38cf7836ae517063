use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Global emucleaner configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Explicit path to the adb executable; discovered when unset
    #[serde(default)]
    pub adb_path: Option<String>,

    /// Timeout applied to every bridge command, in seconds
    #[serde(default = "default_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Pause after adbd restarts as root, in milliseconds
    #[serde(default = "default_root_settle_ms")]
    pub root_settle_ms: u64,

    /// Override for the virtual device home (~/.android/avd)
    #[serde(default)]
    pub avd_home: Option<PathBuf>,

    /// Only list user-installed packages
    #[serde(default = "default_third_party_only")]
    pub third_party_only: bool,

    /// Packages hidden from the installed-apps listing
    #[serde(default)]
    pub exclude_packages: Vec<String>,

    /// Output format preference
    #[serde(default)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Quiet,
}

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_root_settle_ms() -> u64 {
    1000
}
fn default_third_party_only() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adb_path: None,
            command_timeout_secs: default_timeout_secs(),
            root_settle_ms: default_root_settle_ms(),
            avd_home: None,
            third_party_only: default_third_party_only(),
            exclude_packages: Vec::new(),
            output_format: OutputFormat::Human,
        }
    }
}

impl Config {
    /// Get the emucleaner data directory (~/.emucleaner)
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".emucleaner")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Get the logs directory
    pub fn logs_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Load config from file, or fall back to defaults if it does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Parse a config document; missing keys take their defaults
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        if config.command_timeout_secs == 0 {
            bail!("command_timeout_secs must be greater than zero");
        }
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        Self::init_dirs()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Initialize all emucleaner directories
    pub fn init_dirs() -> Result<()> {
        for dir in [Self::data_dir(), Self::logs_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Set a single key from its string form, as typed on the command line
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "adb_path" => {
                self.adb_path = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            "command_timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("'{}' is not a number of seconds", value))?;
                if secs == 0 {
                    bail!("command_timeout_secs must be greater than zero");
                }
                self.command_timeout_secs = secs;
            }
            "root_settle_ms" => {
                self.root_settle_ms = value
                    .parse()
                    .with_context(|| format!("'{}' is not a number of milliseconds", value))?;
            }
            "avd_home" => {
                self.avd_home = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            "third_party_only" => {
                self.third_party_only = value
                    .parse()
                    .with_context(|| format!("'{}' is not true or false", value))?;
            }
            "exclude_packages" => {
                self.exclude_packages = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }
            "output_format" => {
                self.output_format = match value {
                    "human" => OutputFormat::Human,
                    "json" => OutputFormat::Json,
                    "quiet" => OutputFormat::Quiet,
                    other => bail!("Unknown output format '{}'", other),
                };
            }
            other => bail!("Unknown config key '{}'", other),
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn root_settle(&self) -> Duration {
        Duration::from_millis(self.root_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.command_timeout_secs, 30);
        assert_eq!(config.command_timeout(), Duration::from_secs(30));
        assert_eq!(config.root_settle(), Duration::from_millis(1000));
        assert!(config.third_party_only);
        assert!(config.adb_path.is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml("command_timeout_secs = 5\n").unwrap();
        assert_eq!(config.command_timeout_secs, 5);
        assert_eq!(config.root_settle_ms, 1000);
        assert_eq!(config.output_format, OutputFormat::Human);
    }

    #[test]
    fn test_zero_timeout_in_file_is_rejected() {
        let err = Config::from_toml("command_timeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_toml_roundtrip_keeps_excludes() {
        let mut config = Config::default();
        config.exclude_packages = vec!["com.android.chrome".to_string()];
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::default();
        config.set("command_timeout_secs", "10").unwrap();
        assert_eq!(config.command_timeout_secs, 10);
        assert!(config.set("command_timeout_secs", "0").is_err());
        assert!(config.set("command_timeout_secs", "soon").is_err());
        assert!(config.set("no_such_key", "1").is_err());

        config.set("exclude_packages", "com.a, com.b,").unwrap();
        assert_eq!(config.exclude_packages, vec!["com.a", "com.b"]);
    }
}
