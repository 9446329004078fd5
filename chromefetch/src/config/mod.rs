//! Configuration file support.
//!
//! Settings live in an optional INI file at
//! `<config dir>/chromefetch/config.ini`:
//!
//! ```ini
//! [install]
//! root = /home/ci/.local-chromium
//! installer = node
//! args = --unhandled-rejections=strict /opt/puppeteer/install.js
//! revision = 123456
//!
//! [retry]
//! max_retries = 5
//! backoff_base = 2.0
//! initial_delay_ms = 100
//! ```
//!
//! Every key is optional; a missing file yields the defaults. CLI flags
//! take precedence over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::retry::RetryPolicy;

/// Errors loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or parsed as INI.
    #[error("failed to read config {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    /// A value has the wrong shape (e.g. non-numeric retry count).
    #[error("invalid config value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// `[install]` section.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstallSection {
    /// Managed installation root. Defaults to `~/.local-chromium`.
    pub root: Option<PathBuf>,
    /// Installer program override.
    pub installer: Option<String>,
    /// Installer arguments, whitespace-separated in the file.
    pub args: Vec<String>,
    /// Chromium revision, used by the remediation step.
    pub revision: Option<String>,
}

/// `[retry]` section.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrySection {
    pub max_retries: u32,
    pub backoff_base: f64,
    pub initial_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            backoff_base: policy.backoff_base,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
        }
    }
}

impl RetrySection {
    /// Convert to a [`RetryPolicy`].
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_backoff_base(self.backoff_base)
            .with_initial_delay(Duration::from_millis(self.initial_delay_ms))
    }
}

/// Parsed configuration file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigFile {
    pub install: InstallSection,
    pub retry: RetrySection,
}

impl ConfigFile {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("chromefetch").join("config.ini"))
    }

    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path.
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();

        if let Some(section) = ini.section(Some("install")) {
            config.install.root = section.get("root").map(PathBuf::from);
            config.install.installer = section.get("installer").map(str::to_string);
            if let Some(args) = section.get("args") {
                config.install.args = args.split_whitespace().map(str::to_string).collect();
            }
            config.install.revision = section.get("revision").map(str::to_string);
        }

        if let Some(section) = ini.section(Some("retry")) {
            if let Some(value) = section.get("max_retries") {
                config.retry.max_retries = parse_value("retry.max_retries", value)?;
            }
            if let Some(value) = section.get("backoff_base") {
                config.retry.backoff_base = parse_value("retry.backoff_base", value)?;
            }
            if let Some(value) = section.get("initial_delay_ms") {
                config.retry.initial_delay_ms = parse_value("retry.initial_delay_ms", value)?;
            }
        }

        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_retry_section_matches_policy_defaults() {
        let section = RetrySection::default();
        assert_eq!(section.max_retries, 5);
        assert_eq!(section.backoff_base, 2.0);
        assert_eq!(section.initial_delay_ms, 100);
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            "[install]\n\
             root = /srv/chromium\n\
             installer = node\n\
             args = --unhandled-rejections=strict install.js\n\
             revision = 123456\n\
             \n\
             [retry]\n\
             max_retries = 3\n\
             backoff_base = 1.5\n\
             initial_delay_ms = 50\n",
        );

        let config = ConfigFile::load_path(file.path()).unwrap();
        assert_eq!(config.install.root, Some(PathBuf::from("/srv/chromium")));
        assert_eq!(config.install.installer.as_deref(), Some("node"));
        assert_eq!(config.install.args.len(), 2);
        assert_eq!(config.install.revision.as_deref(), Some("123456"));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.backoff_base, 1.5);

        let policy = config.retry.to_policy();
        assert_eq!(policy.initial_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let file = write_config("");
        let config = ConfigFile::load_path(file.path()).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let file = write_config("[retry]\nmax_retries = lots\n");
        let result = ConfigFile::load_path(file.path());
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
