//! # File Management Module
//!
//! Questo modulo gestisce la discovery degli asset in staging e la loro
//! classificazione.
//!
//! ## Responsabilità:
//! - Enumerazione dei file direttamente contenuti nella directory di staging
//! - Esclusione di file nascosti e sottodirectory
//! - Classificazione per estensione (immagine, media grezzo, rifiutato)
//! - Formattazione human-readable delle dimensioni
//!
//! ## Classificazione:
//! - **Image**: estensioni in `Config::image_extensions` → ottimizzazione JPEG
//! - **RawMedia**: estensioni in `Config::raw_extensions` → copia passthrough
//! - **Rejected**: qualsiasi altra estensione o nessuna estensione → ignorato
//!
//! Il confronto è case-insensitive (`photo.PNG` è un'immagine).
//!
//! ## Esempio:
//! ```ignore
//! let classifier = Classifier::from_config(&config);
//! for file in FileManager::find_staging_files(&config.staging_path())? {
//!     match classifier.classify(&file) {
//!         AssetKind::Image => { /* optimize */ }
//!         AssetKind::RawMedia => { /* copy */ }
//!         AssetKind::Rejected => { /* skip */ }
//!     }
//! }
//! ```

use crate::config::{normalize_extension, Config};
use crate::error::IngestError;
use crate::utils::{dotted_extension, is_hidden};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Handling flow chosen for a staging file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Re-encoded as JPEG
    Image,
    /// Copied byte for byte
    RawMedia,
    /// Left in staging
    Rejected,
}

impl AssetKind {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::RawMedia => "raw media",
            Self::Rejected => "unsupported",
        }
    }
}

/// Routes files to a handling flow by extension
#[derive(Debug, Clone)]
pub struct Classifier {
    image_extensions: HashSet<String>,
    raw_extensions: HashSet<String>,
}

impl Classifier {
    pub fn new<I, R, S, T>(image_extensions: I, raw_extensions: R) -> Self
    where
        I: IntoIterator<Item = S>,
        R: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            image_extensions: image_extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .collect(),
            raw_extensions: raw_extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.image_extensions, &config.raw_extensions)
    }

    /// Classify a file by its (case-folded) extension
    pub fn classify(&self, path: &Path) -> AssetKind {
        match dotted_extension(path) {
            Some(ext) if self.image_extensions.contains(&ext) => AssetKind::Image,
            Some(ext) if self.raw_extensions.contains(&ext) => AssetKind::RawMedia,
            _ => AssetKind::Rejected,
        }
    }
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Get the size of a file in bytes
    pub async fn get_file_size(path: &Path) -> Result<u64, IngestError> {
        let metadata = fs::metadata(path).await?;
        Ok(metadata.len())
    }

    /// Find the regular, non-hidden files directly inside the staging directory.
    ///
    /// Subdirectories are neither returned nor descended into. A missing
    /// staging directory yields an empty list. Results are sorted by path.
    pub fn find_staging_files(staging_dir: &Path) -> Result<Vec<PathBuf>> {
        if !staging_dir.exists() {
            tracing::warn!("Staging directory does not exist: {}", staging_dir.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(staging_dir).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| {
                format!("Failed to read staging directory {}", staging_dir.display())
            })?;
            if entry.file_type().is_file() && !is_hidden(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn classifier() -> Classifier {
        Classifier::from_config(&Config::default())
    }

    #[test]
    fn test_classify_images() {
        let c = classifier();
        for name in ["a.jpg", "b.JPEG", "photo.PNG", "c.webp"] {
            assert_eq!(c.classify(Path::new(name)), AssetKind::Image, "{}", name);
        }
    }

    #[test]
    fn test_classify_raw_media() {
        let c = classifier();
        for name in ["a.gif", "clip.MP4", "b.webm", "song.mp3", "c.wav", "d.Ogg"] {
            assert_eq!(c.classify(Path::new(name)), AssetKind::RawMedia, "{}", name);
        }
    }

    #[test]
    fn test_classify_rejected() {
        let c = classifier();
        for name in ["notes.txt", "README", "photo.tiff", "movie.mov", ".hidden"] {
            assert_eq!(c.classify(Path::new(name)), AssetKind::Rejected, "{}", name);
        }
    }

    #[test]
    fn test_classification_is_idempotent() {
        let c = classifier();
        let path = Path::new("/staging/Photo.Png");
        let first = c.classify(path);
        assert!((0..5).all(|_| c.classify(path) == first));
    }

    #[test]
    fn test_custom_extension_sets() {
        let c = Classifier::new(["tiff"], [".MOV"]);
        assert_eq!(c.classify(Path::new("x.TIFF")), AssetKind::Image);
        assert_eq!(c.classify(Path::new("x.mov")), AssetKind::RawMedia);
        assert_eq!(c.classify(Path::new("x.jpg")), AssetKind::Rejected);
    }

    #[test]
    fn test_find_staging_files_skips_hidden_and_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let staging = temp_dir.path();
        std::fs::write(staging.join("b.png"), b"x").unwrap();
        std::fs::write(staging.join("a.mp4"), b"x").unwrap();
        std::fs::write(staging.join(".DS_Store"), b"x").unwrap();
        std::fs::create_dir(staging.join("nested")).unwrap();
        std::fs::write(staging.join("nested").join("deep.png"), b"x").unwrap();

        let files = FileManager::find_staging_files(staging).unwrap();
        assert_eq!(files, vec![staging.join("a.mp4"), staging.join("b.png")]);
    }

    #[test]
    fn test_find_staging_files_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let files = FileManager::find_staging_files(&temp_dir.path().join("absent")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(1536), "1.50 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_calculate_reduction() {
        assert_eq!(FileManager::calculate_reduction(0, 10), 0.0);
        assert_eq!(FileManager::calculate_reduction(200, 50), 75.0);
    }
}
