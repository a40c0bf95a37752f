//! # Optimizer Module
//!
//! Modulo che separa le responsabilità della pipeline in sottomoduli:
//! - `media_optimizer`: Orchestratore principale (staging → export → sync)
//! - `task_optimizer`: Worker per singoli file
//! - `path_resolver`: Calcolo dei path tokenizzati di output

pub mod media_optimizer;
pub mod path_resolver;
pub mod task_optimizer;

pub use media_optimizer::{IngestReport, MediaOptimizer, RunReport, SyncStatus};
pub use path_resolver::PathResolver;
pub use task_optimizer::{AssetOutcome, ExportedAsset, TaskOptimizer};
