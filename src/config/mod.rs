//! Preview configuration from `mdpeek.toml` and the command line.
//!
//! # Sections
//!
//! | Section   | Purpose                                        |
//! |-----------|------------------------------------------------|
//! | `[serve]` | Listener address, browser opening, heartbeat   |
//! | `[watch]` | Debounce and re-watch timing                   |
//!
//! The file is optional. CLI flags win over file values.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{ServeConfig, WatchConfig};

use crate::{cli::Cli, log};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file looked up in the current directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "mdpeek.toml";

/// Root configuration structure representing mdpeek.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PreviewConfig {
    /// Preview server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// File watcher settings
    #[serde(default)]
    pub watch: WatchConfig,
}

impl PreviewConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// An explicit `--config` path must exist; the default file may be absent.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_path(path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_path(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {} ignored: {}", path.display(), ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(interface) = &cli.interface {
            self.serve.interface = interface.clone();
        }
        if let Some(port) = cli.port {
            self.serve.port = port;
        }
        if cli.no_open {
            self.serve.open = false;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.serve.interface.trim().is_empty() {
            return Err(ConfigError::invalid("serve.interface", "must not be empty"));
        }
        if self.serve.port == 0 {
            return Err(ConfigError::invalid("serve.port", "must be between 1 and 65535"));
        }
        if self.serve.heartbeat_secs == 0 {
            return Err(ConfigError::invalid("serve.heartbeat_secs", "must be at least 1"));
        }
        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::invalid("watch.debounce_ms", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mdpeek").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (config, ignored) =
            PreviewConfig::parse_with_ignored("[serve]\nport = 4000\ncolour = true\n[extra]\na = 1")
                .unwrap();

        assert_eq!(config.serve.port, 4000);
        assert_eq!(ignored, vec!["serve.colour".to_string(), "extra".to_string()]);
    }

    #[test]
    fn test_syntax_error() {
        let err = PreviewConfig::from_str("[serve\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[serve]\nport = 4000\ninterface = \"127.0.0.1\"").unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let config = PreviewConfig::load(&cli(&["-C", &path_arg, "-p", "5000", "--no-open"])).unwrap();

        assert_eq!(config.serve.port, 5000);
        assert_eq!(config.serve.interface, "127.0.0.1");
        assert!(!config.serve.open);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let path_arg = path.to_string_lossy().into_owned();

        let err = PreviewConfig::load(&cli(&["-C", &path_arg])).unwrap_err();
        assert!(matches!(err, ConfigError::Io(p, _) if p == path));
    }

    #[test]
    fn test_validation_rejects_zero_port() {
        let config = PreviewConfig::from_str("[serve]\nport = 0").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field: "serve.port", .. }));
    }

    #[test]
    fn test_validation_rejects_zero_heartbeat() {
        let config = PreviewConfig::from_str("[serve]\nheartbeat_secs = 0").unwrap();
        assert!(config.validate().is_err());
    }
}
