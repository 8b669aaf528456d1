//! Review configuration.
//!
//! # Responsibility
//! - Hold user-tunable settings for note discovery, reports and logging.
//! - Load settings from TOML with per-field defaults.
//!
//! # Invariants
//! - A config returned by `load`/`from_toml_str` has passed `validate()`.
//! - Tag names inside the metadata line are not configurable; only which
//!   notes are considered and how reports are titled.

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Configuration load/validation error.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config syntax: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Settings for review listing, reports and logging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReviewConfig {
    /// Root directory of the note collection.
    pub notes_dir: PathBuf,
    /// Top-level folders never scanned for projects.
    pub folders_to_ignore: Vec<String>,
    /// Hashtags that make a note reviewable.
    pub note_type_tags: Vec<String>,
    /// Top heading of the review report.
    pub summary_heading: String,
    /// Heading of the finished projects section.
    pub completed_heading: String,
    pub log_level: String,
    /// Absolute directory for rolling log files; logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from("."),
            folders_to_ignore: vec![
                "@Archive".to_string(),
                "@Trash".to_string(),
                "@Templates".to_string(),
            ],
            note_type_tags: vec!["#project".to_string(), "#area".to_string()],
            summary_heading: "Review List".to_string(),
            completed_heading: "Completed Projects/Areas".to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ReviewConfig {
    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.note_type_tags.is_empty() {
            return Err(ConfigError::Invalid(
                "note_type_tags must list at least one hashtag".to_string(),
            ));
        }
        if let Some(tag) = self
            .note_type_tags
            .iter()
            .find(|tag| !tag.starts_with('#') || tag.trim().len() < 2)
        {
            return Err(ConfigError::Invalid(format!(
                "note_type_tags entry `{tag}` must look like `#name`"
            )));
        }
        if self.summary_heading.trim().is_empty() || self.completed_heading.trim().is_empty() {
            return Err(ConfigError::Invalid("headings cannot be empty".to_string()));
        }
        normalize_level(&self.log_level).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if let Some(dir) = self.log_dir.as_deref().filter(|dir| !dir.is_absolute()) {
            return Err(ConfigError::Invalid(format!(
                "log_dir must be an absolute path, got `{}`",
                dir.display()
            )));
        }
        Ok(())
    }

    /// Whether a host-relative filename lives in an ignored folder.
    pub fn is_ignored(&self, filename: &str) -> bool {
        let top = filename.split('/').next().unwrap_or_default();
        filename.contains('/') && self.folders_to_ignore.iter().any(|folder| folder == top)
    }
}
