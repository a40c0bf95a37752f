//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di ingestione e sync
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Risolve le directory di staging/export rispetto alla root del repository
//!
//! ## Parametri di configurazione:
//! - `repo_root`: Root del repository git (default: ".")
//! - `staging_dir`: Directory di ingestione (default: "staging")
//! - `export_dir`: Directory pubblicata e versionata (default: "images")
//! - `quality`: Qualità JPEG (1-100, default: 95)
//! - `max_width`: Larghezza massima in pixel (default: 1920)
//! - `image_extensions` / `raw_extensions`: Vettori di classificazione
//! - `background`: Colore RGB per appiattire la trasparenza (default: bianco)
//! - `remote` / `branch` / `commit_message`: Parametri di sincronizzazione git
//! - `dry_run`: Solo classificazione e report, nessuna modifica (default: false)
//! - `skip_sync`: Processa gli asset ma non invoca git (default: false)
//! - `json_output`: Eventi JSON su stdout (default: false)
//!
//! ## Validazione:
//! - Controlla che quality sia 1-100
//! - Controlla che max_width sia > 0
//! - Controlla che nessuna estensione appartenga a entrambi i vettori
//! - Controlla che staging ed export non coincidano
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     quality: 85,
//!     max_width: 1280,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::IngestError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-repository configuration file looked up in the repo root
pub const REPO_CONFIG_FILE: &str = "asset-ingest.json";

/// Configuration for asset ingestion and synchronization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repository root; relative directories are resolved against it
    pub repo_root: PathBuf,
    /// Staging directory (input)
    pub staging_dir: PathBuf,
    /// Export directory (output, version controlled)
    pub export_dir: PathBuf,
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Images wider than this are downscaled
    pub max_width: u32,
    /// Extensions routed to the image optimizer
    pub image_extensions: Vec<String>,
    /// Extensions copied through untouched
    pub raw_extensions: Vec<String>,
    /// RGB color transparent pixels are composited onto
    pub background: [u8; 3],
    /// Remote to push to
    pub remote: String,
    /// Branch to push
    pub branch: String,
    /// Message of the automatic commit
    pub commit_message: String,
    /// Dry run - classify and report without touching any file
    pub dry_run: bool,
    /// Process assets but never invoke git
    pub skip_sync: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            staging_dir: PathBuf::from("staging"),
            export_dir: PathBuf::from("images"),
            quality: 95,
            max_width: 1920,
            image_extensions: [".jpg", ".jpeg", ".png", ".webp"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            raw_extensions: [".gif", ".mp4", ".webm", ".mp3", ".wav", ".ogg"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            background: [255, 255, 255],
            remote: "origin".to_string(),
            branch: "main".to_string(),
            commit_message: "sys-auto: ingest new tokenized assets".to_string(),
            dry_run: false,
            skip_sync: false,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.quality == 0 || self.quality > 100 {
            return Err(IngestError::Validation(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        if self.max_width == 0 {
            return Err(IngestError::Validation(
                "Max width must be greater than 0".to_string(),
            ));
        }

        let images: Vec<String> = self.image_extensions.iter().map(|e| normalize_extension(e)).collect();
        if let Some(shared) = self
            .raw_extensions
            .iter()
            .map(|e| normalize_extension(e))
            .find(|e| images.contains(e))
        {
            return Err(IngestError::Validation(format!(
                "Extension {} is listed both as image and raw media",
                shared
            )));
        }

        for (name, value) in [
            ("remote", &self.remote),
            ("branch", &self.branch),
            ("commit message", &self.commit_message),
        ] {
            if value.trim().is_empty() {
                return Err(IngestError::Validation(format!("The {} must not be empty", name)));
            }
        }

        if self.staging_path() == self.export_path() {
            return Err(IngestError::Validation(format!(
                "Staging and export directories must differ: {}",
                self.staging_path().display()
            )));
        }

        Ok(())
    }

    /// Absolute (or root-relative) path of the staging directory
    pub fn staging_path(&self) -> PathBuf {
        self.repo_root.join(&self.staging_dir)
    }

    /// Absolute (or root-relative) path of the export directory
    pub fn export_path(&self) -> PathBuf {
        self.repo_root.join(&self.export_dir)
    }

    /// Load configuration from file.
    ///
    /// The result is not validated: command line overrides may still fix
    /// an out-of-range value, so callers validate the final configuration.
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No configuration file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Find the configuration file to use for a repository.
    ///
    /// An explicit path wins, then `asset-ingest.json` in the repository
    /// root, then `<user config dir>/asset-ingest/config.json`. An explicit
    /// path that does not exist is an error, never a silent fallback.
    pub fn locate(explicit: Option<&Path>, repo_root: &Path) -> Result<Option<PathBuf>, IngestError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(IngestError::Validation(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path.to_path_buf()));
        }

        let in_repo = repo_root.join(REPO_CONFIG_FILE);
        if in_repo.exists() {
            return Ok(Some(in_repo));
        }

        Ok(dirs::config_dir()
            .map(|dir| dir.join("asset-ingest").join("config.json"))
            .filter(|path| path.exists()))
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Lowercase an extension and make sure it carries a leading dot
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.quality = 0;
        assert!(config.validate().is_err());

        config.quality = 101;
        assert!(config.validate().is_err());

        config.quality = 85;
        config.max_width = 0;
        assert!(config.validate().is_err());

        config.max_width = 1920;
        config.branch = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overlapping_extensions_rejected() {
        let config = Config {
            raw_extensions: vec!["PNG".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(".png"));
    }

    #[test]
    fn test_same_staging_and_export_rejected() {
        let config = Config {
            export_dir: PathBuf::from("staging"),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.quality, 95);
        assert_eq!(config.max_width, 1920);
        assert_eq!(config.background, [255, 255, 255]);
        assert_eq!(config.remote, "origin");
        assert_eq!(config.branch, "main");
        assert!(!config.dry_run);
        assert!(config.image_extensions.contains(&".webp".to_string()));
        assert!(config.raw_extensions.contains(&".ogg".to_string()));
    }

    #[test]
    fn test_paths_resolve_against_root() {
        let config = Config {
            repo_root: PathBuf::from("/srv/site"),
            ..Default::default()
        };
        assert_eq!(config.staging_path(), PathBuf::from("/srv/site/staging"));
        assert_eq!(config.export_path(), PathBuf::from("/srv/site/images"));
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("JPG"), ".jpg");
        assert_eq!(normalize_extension(".Mp4"), ".mp4");
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            quality: 85,
            max_width: 1280,
            remote: "upstream".to_string(),
            branch: "assets".to_string(),
            skip_sync: true,
            ..Default::default()
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config, original_config);
    }

    #[tokio::test]
    async fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "quality": 85 }"#).await.unwrap();

        let loaded = Config::from_file(&config_path).await.unwrap();
        assert_eq!(loaded.quality, 85);
        assert_eq!(loaded.max_width, 1920);
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::from_file(&temp_dir.path().join("absent.json")).await.unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_locate_prefers_repo_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(REPO_CONFIG_FILE), "{}").unwrap();

        let found = Config::locate(None, temp_dir.path()).unwrap();
        assert_eq!(found, Some(temp_dir.path().join(REPO_CONFIG_FILE)));

        let explicit = temp_dir.path().join("other.json");
        std::fs::write(&explicit, "{}").unwrap();
        assert_eq!(Config::locate(Some(&explicit), temp_dir.path()).unwrap(), Some(explicit));
    }

    #[test]
    fn test_locate_rejects_missing_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(REPO_CONFIG_FILE), "{}").unwrap();

        let typo = temp_dir.path().join("prod-typo.json");
        let err = Config::locate(Some(&typo), temp_dir.path()).unwrap_err();
        assert!(matches!(err, IngestError::Validation(ref msg) if msg.contains("prod-typo.json")));
    }

    #[tokio::test]
    async fn test_out_of_range_file_value_can_be_overridden() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"quality": 0}"#).unwrap();

        let mut loaded = Config::from_file(&path).await.unwrap();
        assert_eq!(loaded.quality, 0);
        assert!(loaded.validate().is_err());

        loaded.quality = 90;
        assert!(loaded.validate().is_ok());
    }
}
