use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::GalleryError;
use crate::gallery::GalleryOptions;
use crate::state::dataset::PathRewrite;
use crate::Result;

/// User configuration, stored as JSON
///
/// The file lives in the user's config directory:
/// - Linux: ~/.config/sample-gallery/config.json
/// - macOS: ~/Library/Application Support/sample-gallery/config.json
/// - Windows: %APPDATA%\sample-gallery\config.json
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory prepended to image paths (unset for local runs)
    pub path_prefix: Option<PathBuf>,

    /// Fragment identifying tables whose paths were rewritten by older tooling
    pub rewritten_marker: Option<String>,

    /// Seed for reproducible gallery sampling
    pub seed: Option<u64>,

    /// TrueType/OpenType font used to draw captions into rendered figures
    pub font_path: Option<PathBuf>,

    /// Default gallery options
    pub gallery: GalleryOptions,
}

impl Config {
    /// Get the path where the config file is expected
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("sample-gallery");
            path.push("config.json");
            path
        })
    }

    /// Load from an explicit path; the file must exist
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)
            .map_err(|e| GalleryError::Config(format!("{}: {}", path.display(), e)))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, else from the default location;
    /// a missing default file means default settings
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn path_rewrite(&self) -> PathRewrite {
        PathRewrite {
            prefix: self.path_prefix.clone(),
            marker: self.rewritten_marker.clone(),
        }
    }

    /// Seeded generator when a seed is configured, entropy-seeded otherwise
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
