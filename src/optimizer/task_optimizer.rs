//! # Task Optimizer Module
//!
//! Worker per l'elaborazione di un singolo asset di staging.
//! Classifica, esporta con nome tokenizzato e rimuove l'originale.
//! Un errore non esce mai da qui: diventa un `AssetOutcome::Failed`.

use crate::{
    config::Config,
    error::IngestError,
    file_manager::{AssetKind, Classifier, FileManager},
    image_processor::{Dimensions, ImageProcessor},
    media_passthrough::RawMediaCopier,
    optimizer::path_resolver::PathResolver,
    token::Token,
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An asset written to the export directory
#[derive(Debug, Clone)]
pub struct ExportedAsset {
    pub source: PathBuf,
    pub output: PathBuf,
    pub token: Token,
    pub kind: AssetKind,
    pub original_size: u64,
    pub output_size: u64,
    /// Source and output dimensions, images only
    pub dimensions: Option<(Dimensions, Dimensions)>,
}

/// What happened to one staging file
#[derive(Debug, Clone)]
pub enum AssetOutcome {
    /// Exported and removed from staging
    Exported(ExportedAsset),
    /// Unsupported extension; left in staging
    Rejected { source: PathBuf },
    /// Processing failed; left in staging
    Failed {
        source: PathBuf,
        kind: AssetKind,
        error: String,
    },
    /// Dry run: what would have been written
    Planned {
        source: PathBuf,
        kind: AssetKind,
        output: PathBuf,
    },
}

impl AssetOutcome {
    pub fn source(&self) -> &Path {
        match self {
            Self::Exported(asset) => &asset.source,
            Self::Rejected { source }
            | Self::Failed { source, .. }
            | Self::Planned { source, .. } => source,
        }
    }
}

/// Worker per elaborazione singoli file
pub struct TaskOptimizer {
    classifier: Classifier,
    image_processor: ImageProcessor,
    raw_copier: RawMediaCopier,
    export_dir: PathBuf,
    dry_run: bool,
}

impl TaskOptimizer {
    /// Crea nuovo task optimizer
    pub fn new(config: &Config) -> Self {
        Self {
            classifier: Classifier::from_config(config),
            image_processor: ImageProcessor::new(config),
            raw_copier: RawMediaCopier::new(),
            export_dir: config.export_path(),
            dry_run: config.dry_run,
        }
    }

    /// Processa un singolo file
    pub async fn process_single_file(&self, file_path: &Path) -> AssetOutcome {
        let kind = self.classifier.classify(file_path);
        if kind == AssetKind::Rejected {
            return AssetOutcome::Rejected {
                source: file_path.to_path_buf(),
            };
        }

        let token = Token::generate();
        let output = match PathResolver::get_output_path(file_path, &self.export_dir, kind, &token) {
            Ok(output) => output,
            Err(e) => return Self::failed(file_path, kind, e.to_string()),
        };

        if self.dry_run {
            return AssetOutcome::Planned {
                source: file_path.to_path_buf(),
                kind,
                output,
            };
        }

        match self.export(file_path, &output, kind, token).await {
            Ok(asset) => AssetOutcome::Exported(asset),
            Err(e) => Self::failed(file_path, kind, e.to_string()),
        }
    }

    /// Scrive l'output e, solo se riuscito, rimuove il sorgente
    async fn export(
        &self,
        file_path: &Path,
        output: &Path,
        kind: AssetKind,
        token: Token,
    ) -> Result<ExportedAsset, IngestError> {
        let original_size = FileManager::get_file_size(file_path).await?;

        let (output_size, dimensions) = match kind {
            AssetKind::Image => {
                let optimized = self.image_processor.optimize(file_path, output).await?;
                (optimized.bytes_written, Some((optimized.source, optimized.output)))
            }
            AssetKind::RawMedia => (self.raw_copier.copy(file_path, output).await?, None),
            AssetKind::Rejected => {
                return Err(IngestError::UnsupportedFormat(file_path.display().to_string()))
            }
        };

        self.remove_source(file_path, output).await?;

        Ok(ExportedAsset {
            source: file_path.to_path_buf(),
            output: output.to_path_buf(),
            token,
            kind,
            original_size,
            output_size,
            dimensions,
        })
    }

    /// Rimuove il file di staging; se fallisce, ritira l'output già scritto
    /// così che il prossimo run non produca un duplicato.
    async fn remove_source(&self, file_path: &Path, output: &Path) -> Result<(), IngestError> {
        match tokio::fs::remove_file(file_path).await {
            Ok(()) => {
                debug!("Removed staging file {}", file_path.display());
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Could not remove {} after export, withdrawing {}",
                    file_path.display(),
                    output.display()
                );
                if let Err(cleanup) = tokio::fs::remove_file(output).await {
                    warn!("Failed to withdraw {}: {}", output.display(), cleanup);
                }
                Err(e.into())
            }
        }
    }

    fn failed(file_path: &Path, kind: AssetKind, error: String) -> AssetOutcome {
        AssetOutcome::Failed {
            source: file_path.to_path_buf(),
            kind,
            error,
        }
    }
}
