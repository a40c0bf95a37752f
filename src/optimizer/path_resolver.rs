//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output tokenizzati.
//! Evita duplicazione tra ImageProcessor e RawMediaCopier.
//!
//! Gestisce anche i file temporanei `.ingest-*` che l'encoder JPEG crea
//! nella directory di export: un processo interrotto può lasciarli indietro,
//! e vanno rimossi prima che `git add --all` li veda.

use crate::{file_manager::AssetKind, token::Token, utils::dotted_extension};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Prefix of the temporary files written inside the export directory
pub const TEMP_FILE_PREFIX: &str = ".ingest-";

/// Extension of every optimized image
pub const IMAGE_OUTPUT_EXTENSION: &str = ".jpg";

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Calcola il path di output per un asset classificato
    pub fn get_output_path(
        input_path: &Path,
        export_dir: &Path,
        kind: AssetKind,
        token: &Token,
    ) -> Result<PathBuf> {
        let extension = match kind {
            AssetKind::Image => IMAGE_OUTPUT_EXTENSION.to_string(),
            AssetKind::RawMedia => dotted_extension(input_path).ok_or_else(|| {
                anyhow::anyhow!("Raw media without extension: {}", input_path.display())
            })?,
            AssetKind::Rejected => {
                return Err(anyhow::anyhow!(
                    "No output path for unsupported file: {}",
                    input_path.display()
                ))
            }
        };

        let result = export_dir.join(format!("{}{}", token, extension));
        debug!("Resolved output path: {} -> {}", input_path.display(), result.display());
        Ok(result)
    }

    /// Crea la directory di export se necessario
    pub async fn ensure_export_dir(export_dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(export_dir).await.map_err(|e| {
            anyhow::anyhow!("Failed to create export directory {}: {}", export_dir.display(), e)
        })
    }

    /// Remove temporary files left in the export directory by an
    /// interrupted run. Returns how many were deleted.
    pub fn sweep_stale_temp_files(export_dir: &Path) -> Result<usize> {
        if !export_dir.is_dir() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in WalkDir::new(export_dir).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| {
                format!("Failed to read export directory {}", export_dir.display())
            })?;
            let is_temp = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(TEMP_FILE_PREFIX));
            if !entry.file_type().is_file() || !is_temp {
                continue;
            }

            match std::fs::remove_file(entry.path()) {
                Ok(()) => {
                    warn!("Removed stale temporary file {}", entry.path().display());
                    removed += 1;
                }
                Err(e) => warn!("Could not remove {}: {}", entry.path().display(), e),
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_output_is_always_jpg() {
        let token = Token::generate();
        let out = PathResolver::get_output_path(
            Path::new("/repo/staging/photo.PNG"),
            Path::new("/repo/images"),
            AssetKind::Image,
            &token,
        )
        .unwrap();
        assert_eq!(out, PathBuf::from(format!("/repo/images/{}.jpg", token)));
    }

    #[test]
    fn test_raw_output_keeps_lowercased_extension() {
        let token = Token::generate();
        let out = PathResolver::get_output_path(
            Path::new("/repo/staging/Clip.MP4"),
            Path::new("/repo/images"),
            AssetKind::RawMedia,
            &token,
        )
        .unwrap();
        assert_eq!(out, PathBuf::from(format!("/repo/images/{}.mp4", token)));
    }

    #[test]
    fn test_rejected_has_no_output() {
        let token = Token::generate();
        assert!(PathResolver::get_output_path(
            Path::new("notes.txt"),
            Path::new("/repo/images"),
            AssetKind::Rejected,
            &token,
        )
        .is_err());
    }

    #[tokio::test]
    async fn test_ensure_export_dir_is_recursive() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let nested = temp_dir.path().join("public").join("images");
        PathResolver::ensure_export_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_sweep_removes_only_temp_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let export = temp_dir.path();
        std::fs::write(export.join(".ingest-a1B2c3.jpg"), b"partial").unwrap();
        std::fs::write(export.join(".ingest-opt-x9.jpg"), b"partial").unwrap();
        std::fs::write(export.join("3F2A9C01B7DE.jpg"), b"done").unwrap();
        std::fs::write(export.join(".gitkeep"), b"").unwrap();

        assert_eq!(PathResolver::sweep_stale_temp_files(export).unwrap(), 2);

        let mut left: Vec<_> = std::fs::read_dir(export)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        left.sort();
        assert_eq!(left, vec![".gitkeep", "3F2A9C01B7DE.jpg"]);
    }

    #[test]
    fn test_sweep_missing_dir_is_noop() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        assert_eq!(PathResolver::sweep_stale_temp_files(&temp_dir.path().join("absent")).unwrap(), 0);
    }
}
