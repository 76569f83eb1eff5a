use rand::seq::index;
use rand::Rng;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::data::{Label, Sample};
use crate::error::GalleryError;
use crate::Result;

/// Image extensions picked up when scanning a folder dataset
const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "bmp", "gif", "webp", "tif", "tiff"];

/// How image paths get rebased onto the machine that runs the tutorial
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathRewrite {
    /// Directory prepended to every ImagePath (None = paths are already valid here)
    pub prefix: Option<PathBuf>,
    /// Path fragment that marks tables rewritten by older tooling
    pub marker: Option<String>,
}

impl PathRewrite {
    pub fn with_prefix(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            marker: None,
        }
    }
}

/// An in-memory table of image samples, in table order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    samples: Vec<Sample>,
    paths_rewritten: bool,
}

impl Dataset {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            paths_rewritten: false,
        }
    }

    /// Open a dataset from a CSV file, a JSON file or an image folder
    pub fn open(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Self::from_dir(path);
        }

        match extension_of(path).as_deref() {
            Some("csv") => Self::from_csv(path),
            Some("json") => Self::from_json(path),
            _ => Err(GalleryError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Read a CSV table with a header row
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let samples = reader
            .deserialize::<Sample>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::info!("Loaded {} samples from {}", samples.len(), path.display());
        Ok(Self::new(samples))
    }

    /// Read a JSON array of records
    pub fn from_json(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let samples: Vec<Sample> = serde_json::from_reader(reader)?;

        tracing::info!("Loaded {} samples from {}", samples.len(), path.display());
        Ok(Self::new(samples))
    }

    /// Build a dataset from an image folder laid out as `root/<label>/...`
    ///
    /// Every image below a first-level folder becomes a sample labelled with
    /// that folder's name. Files directly under the root are skipped.
    pub fn from_dir(root: &Path) -> Result<Self> {
        tracing::info!("🔍 Scanning folder: {}", root.display());

        let mut samples = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .min_depth(2)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let is_image = extension_of(path)
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false);
            if !is_image {
                continue;
            }

            let label = path
                .strip_prefix(root)
                .ok()
                .and_then(|relative| relative.components().next())
                .map(|first| first.as_os_str().to_string_lossy().to_string());

            match label {
                Some(label) => samples.push(Sample::new(path, Label::Text(label))),
                None => tracing::warn!("No label folder for {}", path.display()),
            }
        }

        tracing::info!("✅ Found {} images in {}", samples.len(), root.display());
        Ok(Self::new(samples))
    }

    /// Write the table back out, as CSV or JSON depending on the extension
    pub fn save(&self, path: &Path) -> Result<()> {
        match extension_of(path).as_deref() {
            Some("csv") => {
                let mut writer = csv::Writer::from_path(path)?;
                for sample in &self.samples {
                    writer.serialize(sample)?;
                }
                writer.flush()?;
            }
            Some("json") => {
                let writer = BufWriter::new(File::create(path)?);
                serde_json::to_writer_pretty(writer, &self.samples)?;
            }
            _ => return Err(GalleryError::UnsupportedFormat(path.to_path_buf())),
        }

        tracing::info!("Saved {} samples to {}", self.samples.len(), path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn paths_rewritten(&self) -> bool {
        self.paths_rewritten
    }

    /// The first `n` samples in table order
    pub fn head(&self, n: usize) -> &[Sample] {
        &self.samples[..n.min(self.samples.len())]
    }

    /// `n` distinct samples drawn uniformly at random, in draw order
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<&Sample> {
        let amount = n.min(self.samples.len());
        index::sample(rng, self.samples.len(), amount)
            .into_iter()
            .map(|i| &self.samples[i])
            .collect()
    }

    /// Prefix every ImagePath for the current environment, at most once
    ///
    /// Leaves the table untouched when no prefix is configured, when the
    /// table is empty, or when it was already rewritten: tracked by flag
    /// in memory, or detected on the first path (it already starts with
    /// the prefix, or contains the configured marker) for reloaded tables.
    pub fn update_image_paths(&mut self, rewrite: &PathRewrite) {
        let Some(prefix) = rewrite.prefix.as_ref() else {
            tracing::debug!("No path prefix configured, keeping image paths");
            return;
        };

        if self.paths_rewritten {
            tracing::debug!("Image paths already rewritten");
            return;
        }

        let Some(first) = self.samples.first() else {
            return;
        };

        if first.image_path.starts_with(prefix) {
            tracing::debug!("First image path is already under {}", prefix.display());
            self.paths_rewritten = true;
            return;
        }

        if let Some(marker) = rewrite.marker.as_deref() {
            if first.image_path.to_string_lossy().contains(marker) {
                tracing::debug!("First image path contains {:?}, treating as rewritten", marker);
                self.paths_rewritten = true;
                return;
            }
        }

        for sample in &mut self.samples {
            sample.image_path = rebase(prefix, &sample.image_path);
        }
        self.paths_rewritten = true;

        tracing::info!(
            "Prefixed {} image paths with {}",
            self.samples.len(),
            prefix.display()
        );
    }
}

impl From<Vec<Sample>> for Dataset {
    fn from(samples: Vec<Sample>) -> Self {
        Self::new(samples)
    }
}

/// Join `path` under `prefix`, re-rooting absolute paths
fn rebase(prefix: &Path, path: &Path) -> PathBuf {
    let relative: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    prefix.join(relative)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}
