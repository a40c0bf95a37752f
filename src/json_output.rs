//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per scheduler e
//! strumenti che invocano la pipeline.
//!
//! ## Responsabilità:
//! - Emette un messaggio JSON per riga su stdout per ogni evento
//! - Riusa `IngestStats` e `AssetKind` senza strutture parallele
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio ingestione (directory, numero di file, configurazione)
//! - `file_complete`: Fine elaborazione di un file (output o errore)
//! - `sync`: Esito della sincronizzazione git
//! - `complete`: Fine processo con statistiche finali
//! - `error`: Errore generale

use crate::{config::Config, file_manager::AssetKind, progress::IngestStats};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Inizio dell'ingestione
    Start {
        staging_dir: PathBuf,
        export_dir: PathBuf,
        total_files: usize,
        config: JsonConfig,
    },

    /// Fine elaborazione di un file specifico
    FileComplete {
        source: PathBuf,
        kind: AssetKind,
        output: Option<PathBuf>,
        original_size: u64,
        output_size: u64,
        error: Option<String>,
    },

    /// Esito della sincronizzazione
    Sync {
        outcome: String,
        error: Option<String>,
    },

    /// Processo completato
    Complete {
        stats: IngestStats,
        duration_seconds: f64,
    },

    /// Errore generale
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonConfig {
    pub quality: u8,
    pub max_width: u32,
    pub remote: String,
    pub branch: String,
    pub dry_run: bool,
    pub skip_sync: bool,
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            quality: config.quality,
            max_width: config.max_width,
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            dry_run: config.dry_run,
            skip_sync: config.skip_sync,
        }
    }
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Crea un messaggio di errore
    pub fn error(message: impl Into<String>, details: Option<String>) -> Self {
        Self::Error {
            message: message.into(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_complete_shape() {
        let msg = JsonMessage::FileComplete {
            source: PathBuf::from("staging/clip.mp4"),
            kind: AssetKind::RawMedia,
            output: Some(PathBuf::from("images/ABCDEF012345.mp4")),
            original_size: 10,
            output_size: 10,
            error: None,
        };
        let value: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "file_complete");
        assert_eq!(value["kind"], "raw_media");
        assert_eq!(value["output"], "images/ABCDEF012345.mp4");
    }

    #[test]
    fn test_start_carries_config() {
        let msg = JsonMessage::Start {
            staging_dir: PathBuf::from("staging"),
            export_dir: PathBuf::from("images"),
            total_files: 2,
            config: JsonConfig::from(&Config::default()),
        };
        let value: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "start");
        assert_eq!(value["config"]["quality"], 95);
        assert_eq!(value["config"]["branch"], "main");
    }

    #[test]
    fn test_error_constructor() {
        let value = serde_json::to_value(JsonMessage::error("sync failed", None)).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "sync failed");
        assert!(value["details"].is_null());
    }
}
