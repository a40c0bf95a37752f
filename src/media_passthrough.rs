//! # Raw Media Passthrough Module
//!
//! Questo modulo gestisce i media che non vengono ricodificati.
//!
//! ## Responsabilità:
//! - Copia byte-per-byte di GIF, video e audio nella directory di export
//! - Preserva l'estensione originale (in minuscolo) per il riconoscimento del tipo
//! - Preserva permessi e modification time del file sorgente
//! - Rimuove l'output parziale se la copia fallisce
//!
//! ## Formati supportati (default):
//! - **Animazioni**: GIF
//! - **Video**: MP4, WebM
//! - **Audio**: MP3, WAV, OGG
//!
//! ## Esempio:
//! ```ignore
//! let copier = RawMediaCopier::new();
//! let bytes = copier.copy(&staging_file, &export_path).await?;
//! ```

use crate::error::IngestError;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Copies raw media into the export directory without transformation
#[derive(Debug, Clone, Default)]
pub struct RawMediaCopier;

impl RawMediaCopier {
    pub fn new() -> Self {
        Self
    }

    /// Copy `input_path` to `output_path`, keeping permissions and mtime.
    ///
    /// Returns the number of bytes copied.
    pub async fn copy(&self, input_path: &Path, output_path: &Path) -> Result<u64, IngestError> {
        debug!("Copying raw media {} -> {}", input_path.display(), output_path.display());

        let bytes = match tokio::fs::copy(input_path, output_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                Self::discard_partial(output_path).await;
                return Err(e.into());
            }
        };

        if let Err(e) = Self::preserve_times(input_path, output_path) {
            // content and permissions are already in place
            warn!("Could not preserve timestamps on {}: {}", output_path.display(), e);
        }

        Ok(bytes)
    }

    fn preserve_times(input_path: &Path, output_path: &Path) -> std::io::Result<()> {
        let source = std::fs::metadata(input_path)?;
        let times = std::fs::FileTimes::new()
            .set_accessed(source.accessed()?)
            .set_modified(source.modified()?);
        File::options().write(true).open(output_path)?.set_times(times)
    }

    async fn discard_partial(output_path: &Path) {
        if tokio::fs::try_exists(output_path).await.unwrap_or(false) {
            if let Err(e) = tokio::fs::remove_file(output_path).await {
                warn!("Failed to remove partial copy {}: {}", output_path.display(), e);
            }
        }
    }
}
