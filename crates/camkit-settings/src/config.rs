//! Configuration and settings management for CamKit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML files; the default location is `settings.toml` in the platform
//! configuration directory.
//!
//! Settings cover:
//! - Experimental strategy availability
//! - The default machine profile
//! - Logging verbosity
//! - Recently opened session files

use crate::error::{ConfigError, SettingsError, SettingsResult};
use camkit_machine::MachineProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Default log verbosity, overridden by `RUST_LOG`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(ConfigError::ValueOutOfRange {
                key: "log_level".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CamSettings {
    /// Offer experimental strategies (waterline, pencil, ...)
    pub experimental: bool,
    pub log_level: LogLevel,
    /// Machine new sessions are checked against
    pub machine: MachineProfile,
    /// Most recent first
    pub recent_sessions: Vec<PathBuf>,
    pub max_recent_sessions: usize,
}

impl Default for CamSettings {
    fn default() -> Self {
        Self {
            experimental: false,
            log_level: LogLevel::default(),
            machine: MachineProfile::default(),
            recent_sessions: Vec::new(),
            max_recent_sessions: 10,
        }
    }
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
    }
}

impl CamSettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `settings.toml` in the platform configuration directory
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform("no configuration directory".to_string())
        })?;
        Ok(dir.join("camkit").join("settings.toml"))
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let settings: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            info!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save settings to file (JSON or TOML), creating the directory if needed
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| SettingsError::SaveError(e.to_string()))?
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        self.machine.validate()?;

        if self.max_recent_sessions == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "max_recent_sessions".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Add a session file to the recent list
    pub fn add_recent_session(&mut self, path: PathBuf) {
        self.recent_sessions.retain(|p| p != &path);
        self.recent_sessions.insert(0, path);
        self.recent_sessions.truncate(self.max_recent_sessions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = CamSettings::new();
        assert!(settings.validate().is_ok());
        assert!(!settings.experimental);
        assert_eq!(settings.log_level, LogLevel::Info);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Trace.to_string(), "trace");
    }

    #[test]
    fn test_recent_sessions() {
        let mut settings = CamSettings {
            max_recent_sessions: 2,
            ..Default::default()
        };
        settings.add_recent_session(PathBuf::from("a.json"));
        settings.add_recent_session(PathBuf::from("b.json"));
        settings.add_recent_session(PathBuf::from("a.json"));
        settings.add_recent_session(PathBuf::from("c.json"));
        assert_eq!(
            settings.recent_sessions,
            vec![PathBuf::from("c.json"), PathBuf::from("a.json")]
        );
    }

    #[test]
    fn test_zero_recent_sessions_rejected() {
        let settings = CamSettings {
            max_recent_sessions: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Config(ConfigError::ValueOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_unknown_extension() {
        let err = format_of(Path::new("settings.yaml")).err().unwrap();
        assert_eq!(err.to_string(), "Config error: Unsupported config format: yaml");
    }
}
