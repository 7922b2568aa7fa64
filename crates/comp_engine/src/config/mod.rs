//! Loading and saving engine settings
//!
//! Settings files are TOML or RON, picked by file extension. Missing keys fall
//! back to the type's `Default` through `#[serde(default)]` on the settings
//! structs in [`crate::core`].

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// Text format of a settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Pick the format from the extension of `path`, ignoring case
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Settings that round-trip through a TOML or RON file
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Read and parse a settings file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse(path, &contents)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(config)
    }

    /// Parse settings text; `path` only selects the format
    fn parse(path: impl AsRef<Path>, contents: &str) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let parsed = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
            ConfigFormat::Ron => ron::from_str(contents).map_err(|e| e.to_string()),
        };
        parsed.map_err(|reason| ConfigError::Parse {
            path: path.display().to_string(),
            reason,
        })
    }

    /// Write the settings in the format named by the extension
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Errors raised while reading or writing settings files
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file was readable but its contents did not match the settings layout
    #[error("cannot parse {path}: {reason}")]
    Parse {
        /// File being parsed
        path: String,
        /// Deserializer message
        reason: String,
    },

    /// The settings could not be turned into text
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Extension other than `.toml` or `.ron`
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
