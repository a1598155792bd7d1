//! Render configuration
//!
//! Preview and export sizes, JPEG quality and the output directory, stored
//! as pretty-printed JSON. A missing file means defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Render settings shared by the CLI, the preview window and export jobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub preview_width: u32,
    pub preview_height: u32,
    pub export_width: u32,
    pub export_height: u32,
    pub jpeg_quality: u8,
    pub output_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            preview_width: 1280,
            preview_height: 720,
            export_width: 7680,
            export_height: 4320,
            jpeg_quality: 94,
            output_dir: PathBuf::from("."),
        }
    }
}

impl RenderConfig {
    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load config from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config, or fall back to defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("preview", self.preview_width, self.preview_height),
            ("export", self.export_width, self.export_height),
        ];
        for (name, w, h) in sizes {
            if w == 0 || h == 0 {
                return Err(ConfigError::Invalid(format!("{name} size {w}x{h} must be positive")));
            }
            if i32::try_from(w).is_err() || i32::try_from(h).is_err() {
                return Err(ConfigError::Invalid(format!("{name} size {w}x{h} is too large")));
            }
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality {} outside 1..=100",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Parse a `WxH` resolution such as `1920x1080`
pub fn parse_resolution(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("width {w:?}: {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("height {h:?}: {e}"))?;
    if w == 0 || h == 0 {
        return Err(format!("resolution {w}x{h} must be positive"));
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RenderConfig::default();
        assert_eq!(config.export_width, 7680);
        assert_eq!(config.export_height, 4320);
        assert_eq!(config.jpeg_quality, 94);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warscene.json");
        let config = RenderConfig {
            preview_width: 640,
            jpeg_quality: 80,
            ..RenderConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(RenderConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "export_width": 3840, "export_height": 2160 }"#).unwrap();

        let config = RenderConfig::load(&path).unwrap();
        assert_eq!(config.export_width, 3840);
        assert_eq!(config.preview_width, 1280);
        assert_eq!(config.jpeg_quality, 94);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::load_or_default(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero = RenderConfig {
            export_width: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::Invalid(_))));

        let quality = RenderConfig {
            jpeg_quality: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(quality.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(RenderConfig::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("1920x1080"), Ok((1920, 1080)));
        assert_eq!(parse_resolution("640X360"), Ok((640, 360)));
        assert!(parse_resolution("1920").is_err());
        assert!(parse_resolution("0x10").is_err());
        assert!(parse_resolution("axb").is_err());
    }
}
