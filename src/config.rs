//! Exporter configuration.
//!
//! Options are plain typed fields with defaults.  They can be loaded from a
//! JSON file; unknown keys are rejected rather than ignored, and every loaded
//! value goes through [`ExportOptions::validate`].
//!
//! ```json
//! { "object": 2, "transform": "required", "crease_angle": 1.2 }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default `creaseAngle` written into exported scenes.
pub const DEFAULT_CREASE_ANGLE: f32 = 1.56207;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Invalid configuration in {origin}: {source}")]
    Parse { origin: String, source: serde_json::Error },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which scale/translation the exporter applies to coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    /// Use the object's or model's transform when present, identity otherwise.
    #[default]
    Auto,
    /// Fail when neither the object nor the model carries a transform.
    Required,
    /// Always export raw coordinates.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ExportOptions {
    /// 1-based object number; 0 means "not chosen yet".
    pub object:       usize,
    pub transform:    TransformMode,
    pub crease_angle: f32,
    pub output:       PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            object:       0,
            transform:    TransformMode::Auto,
            crease_angle: DEFAULT_CREASE_ANGLE,
            output:       PathBuf::from("imod.wrl"),
        }
    }
}

impl ExportOptions {
    pub fn for_object(object: usize) -> Self {
        Self { object, ..Self::default() }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let opts: Self = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            origin: "inline JSON".into(),
            source,
        })?;
        Ok(opts)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            origin: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.object == 0 {
            return Err(ConfigError::Invalid(
                "an object number (1-based) must be specified".into(),
            ));
        }
        if !self.crease_angle.is_finite() || self.crease_angle < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "crease_angle must be a non-negative finite number, got {}",
                self.crease_angle
            )));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output path is empty".into()));
        }
        Ok(())
    }
}
