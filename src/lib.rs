//! # Asset Ingest Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per ingestione e sincronizzazione
//! - `file_manager`: Discovery dello staging e classificazione per estensione
//! - `image_processor`: Decodifica, ridimensionamento e ricodifica JPEG
//! - `media_passthrough`: Copia byte-per-byte dei media grezzi
//! - `token`: Identificatori opachi per i nomi di output
//! - `optimizer`: Orchestratore principale del processo
//! - `sync`: Commit e push gated sullo stato del working tree
//! - `progress` / `json_output`: Progress bar, statistiche ed eventi JSON
//! - `platform` / `utils`: Risoluzione comandi esterni e helper
//!
//! ## Utilizzo:
//! ```ignore
//! use asset_ingest::{Config, GitCli, MediaOptimizer};
//!
//! let config = Config { repo_root: root.clone(), ..Default::default() };
//! let report = MediaOptimizer::new(config)?.run(&GitCli::new(&root)).await?;
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod media_passthrough;
pub mod optimizer;
pub mod platform;
pub mod progress;
pub mod sync;
pub mod token;
pub mod utils;

pub use config::Config;
pub use error::IngestError;
pub use file_manager::{AssetKind, Classifier};
pub use optimizer::{MediaOptimizer, RunReport, SyncStatus};
pub use sync::{GitCli, SyncGate, SyncOutcome, VcsClient};
pub use token::Token;
