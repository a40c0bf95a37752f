//! # Media Optimizer Main Orchestrator
//!
//! Orchestratore principale: enumera lo staging, delega ogni asset a
//! `TaskOptimizer` in sequenza, aggrega i risultati e, se qualcosa è stato
//! esportato, passa il controllo al `SyncGate`.
//!
//! ## Flusso di esecuzione:
//! 1. **Discovery**: file regolari, non nascosti, direttamente in staging
//! 2. **No-op**: staging vuoto → nessuna directory creata, nessun git
//! 3. **Pulizia**: rimuove i temporanei `.ingest-*` lasciati da run interrotti
//! 4. **Processing**: un asset alla volta, errori isolati per asset
//! 5. **Aggregazione**: `processed_any` + `IngestStats`
//! 6. **Sync**: solo se `processed_any` (e non `skip_sync`)
//!
//! ## Esito del run:
//! - `RunReport::is_success()` è falso se un asset è fallito o se la
//!   sincronizzazione è fallita; `main` lo traduce in exit code 1

use crate::{
    config::Config,
    file_manager::{AssetKind, FileManager},
    json_output::{JsonConfig, JsonMessage},
    optimizer::{
        path_resolver::PathResolver,
        task_optimizer::{AssetOutcome, TaskOptimizer},
    },
    progress::{IngestStats, ProgressManager},
    sync::{SyncGate, SyncOutcome, VcsClient},
};
use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

/// Result of the ingestion phase
#[derive(Debug, Default)]
pub struct IngestReport {
    pub stats: IngestStats,
    pub outcomes: Vec<AssetOutcome>,
    /// At least one asset landed in the export directory
    pub processed_any: bool,
}

impl IngestReport {
    fn record(&mut self, outcome: AssetOutcome) {
        match &outcome {
            AssetOutcome::Exported(asset) => {
                match asset.kind {
                    AssetKind::Image => self.stats.add_image(asset.original_size, asset.output_size),
                    _ => self.stats.add_media(asset.output_size),
                }
                self.processed_any = true;
            }
            AssetOutcome::Rejected { .. } => self.stats.add_rejected(),
            AssetOutcome::Failed { .. } => self.stats.add_error(),
            AssetOutcome::Planned { .. } => {}
        }
        self.outcomes.push(outcome);
    }
}

/// What the sync phase did
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    /// Nothing was exported, so git was never invoked
    NotNeeded,
    /// Disabled by configuration
    Skipped,
    Completed(SyncOutcome),
    Failed(String),
}

impl SyncStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::NotNeeded => "not_needed",
            Self::Skipped => "skipped",
            Self::Completed(SyncOutcome::Clean) => "clean",
            Self::Completed(SyncOutcome::Pushed) => "pushed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Result of a full run
#[derive(Debug)]
pub struct RunReport {
    pub ingest: IngestReport,
    pub sync: SyncStatus,
}

impl RunReport {
    /// No asset failed and synchronization did not fail
    pub fn is_success(&self) -> bool {
        self.ingest.stats.errors == 0 && !matches!(self.sync, SyncStatus::Failed(_))
    }
}

/// Orchestratore principale
pub struct MediaOptimizer {
    config: Config,
    task_optimizer: TaskOptimizer,
}

impl MediaOptimizer {
    /// Crea nuova istanza dell'ottimizzatore
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let task_optimizer = TaskOptimizer::new(&config);
        Ok(Self {
            config,
            task_optimizer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ingest staging, then synchronize if anything was exported
    pub async fn run(&self, vcs: &dyn VcsClient) -> Result<RunReport> {
        let start_time = Instant::now();

        let ingest = self.ingest().await?;
        let sync = self.synchronize(&ingest, vcs).await;

        if self.config.json_output {
            JsonMessage::Complete {
                stats: ingest.stats.clone(),
                duration_seconds: start_time.elapsed().as_secs_f64(),
            }
            .emit();
        } else if ingest.stats.files_found > 0 {
            info!("{}", ingest.stats.format_summary());
        }

        Ok(RunReport { ingest, sync })
    }

    /// Process every eligible staging file, one at a time
    pub async fn ingest(&self) -> Result<IngestReport> {
        let staging = self.config.staging_path();
        let export = self.config.export_path();

        let files = FileManager::find_staging_files(&staging)?;
        if files.is_empty() {
            info!("No assets waiting in staging ({})", staging.display());
            return Ok(IngestReport::default());
        }

        if !self.config.dry_run {
            PathResolver::ensure_export_dir(&export).await?;
            PathResolver::sweep_stale_temp_files(&export)?;
        }

        self.log_configuration(&files);

        let progress = if self.config.json_output {
            JsonMessage::Start {
                staging_dir: staging.clone(),
                export_dir: export.clone(),
                total_files: files.len(),
                config: JsonConfig::from(&self.config),
            }
            .emit();
            ProgressManager::hidden()
        } else {
            ProgressManager::new(files.len() as u64)
        };

        let mut report = IngestReport::default();
        report.stats.files_found = files.len();

        for file_path in files {
            let outcome = self.task_optimizer.process_single_file(&file_path).await;
            self.report_outcome(&outcome, &progress);
            report.record(outcome);
        }

        progress.finish(&report.stats.format_summary());
        Ok(report)
    }

    /// Run the sync gate when the ingest phase exported something
    async fn synchronize(&self, ingest: &IngestReport, vcs: &dyn VcsClient) -> SyncStatus {
        let status = if !ingest.processed_any {
            if ingest.stats.files_found > 0 {
                info!("No asset exported: synchronization skipped");
            }
            SyncStatus::NotNeeded
        } else if self.config.skip_sync {
            info!("Synchronization disabled (--skip-sync)");
            SyncStatus::Skipped
        } else {
            match SyncGate::from_config(&self.config).synchronize(vcs).await {
                Ok(outcome) => SyncStatus::Completed(outcome),
                Err(e) => {
                    error!("Synchronization failed: {}", e);
                    SyncStatus::Failed(e.to_string())
                }
            }
        };

        if self.config.json_output && status != SyncStatus::NotNeeded {
            let error = match &status {
                SyncStatus::Failed(message) => Some(message.clone()),
                _ => None,
            };
            JsonMessage::Sync {
                outcome: status.label().to_string(),
                error,
            }
            .emit();
        }

        status
    }

    /// Logga configurazione (solo se non JSON mode)
    fn log_configuration(&self, files: &[PathBuf]) {
        if self.config.json_output {
            return;
        }

        info!("Staging: {}", self.config.staging_path().display());
        info!("Export: {}", self.config.export_path().display());
        info!(
            "Images -> JPEG (quality: {}, max width: {}px)",
            self.config.quality, self.config.max_width
        );
        if self.config.dry_run {
            info!("Dry run mode: No files will be modified");
        }
        info!("Found {} file(s) in staging", files.len());
    }

    /// Riga di stato per ogni file (o evento JSON)
    fn report_outcome(&self, outcome: &AssetOutcome, progress: &ProgressManager) {
        let name = outcome
            .source()
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();

        if self.config.json_output {
            let message = match outcome {
                AssetOutcome::Exported(asset) => JsonMessage::FileComplete {
                    source: asset.source.clone(),
                    kind: asset.kind,
                    output: Some(asset.output.clone()),
                    original_size: asset.original_size,
                    output_size: asset.output_size,
                    error: None,
                },
                AssetOutcome::Rejected { source } => JsonMessage::FileComplete {
                    source: source.clone(),
                    kind: AssetKind::Rejected,
                    output: None,
                    original_size: 0,
                    output_size: 0,
                    error: None,
                },
                AssetOutcome::Failed { source, kind, error } => JsonMessage::FileComplete {
                    source: source.clone(),
                    kind: *kind,
                    output: None,
                    original_size: 0,
                    output_size: 0,
                    error: Some(error.clone()),
                },
                AssetOutcome::Planned { source, kind, output } => JsonMessage::FileComplete {
                    source: source.clone(),
                    kind: *kind,
                    output: Some(output.clone()),
                    original_size: 0,
                    output_size: 0,
                    error: None,
                },
            };
            message.emit();
            return;
        }

        progress.suspend(|| match outcome {
            AssetOutcome::Exported(asset) => match asset.dimensions {
                Some((source, output)) if source != output => info!(
                    "Image processed: {} -> {} ({} -> {})",
                    name,
                    asset.output.file_name().unwrap_or_default().to_string_lossy(),
                    source,
                    output
                ),
                _ => info!(
                    "{} exported: {} -> {}",
                    if asset.kind == AssetKind::Image { "Image" } else { "Media" },
                    name,
                    asset.output.file_name().unwrap_or_default().to_string_lossy()
                ),
            },
            AssetOutcome::Rejected { .. } => warn!("Unsupported format ignored: {}", name),
            AssetOutcome::Failed { kind, error, .. } => {
                error!("Failed to process {} {}: {}", kind.description(), name, error)
            }
            AssetOutcome::Planned { output, .. } => info!(
                "[dry run] would export {} -> {}",
                name,
                output.file_name().unwrap_or_default().to_string_lossy()
            ),
        });
        progress.update(&name);
    }
}
