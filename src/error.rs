//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `IngestError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, copia fallita)
//! - `Image`: Errori di decode/encode immagini (formati corrotti, etc.)
//! - `Persist`: Rename atomico del file temporaneo nella directory di export
//! - `Vcs`: Comando git terminato con exit code non-zero
//! - `MissingDependency`: Tool esterno mancante (git)
//! - `UnsupportedFormat`: Formato file non supportato
//! - `Validation`: Errori di validazione configurazione
//!
//! ## Politica di propagazione:
//! - Errori per singolo asset restano locali all'asset (il batch continua)
//! - Errori `Vcs` terminano solo la fase di sincronizzazione
//!
//! ## Esempio:
//! ```ignore
//! if !output.status.success() {
//!     return Err(IngestError::Vcs {
//!         operation: "push".to_string(),
//!         code: output.status.code(),
//!         stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
//!     });
//! }
//! ```

/// Custom error types for asset ingestion and synchronization
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to move temporary file into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("git {operation} failed (exit code {}): {stderr}", exit_code(.code))]
    Vcs {
        operation: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{tool} failed (exit code {}): {stderr}", exit_code(.code))]
    ExternalTool {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        // killed by a signal
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcs_error_message() {
        let err = IngestError::Vcs {
            operation: "push".to_string(),
            code: Some(128),
            stderr: "remote rejected".to_string(),
        };
        assert_eq!(err.to_string(), "git push failed (exit code 128): remote rejected");

        let killed = IngestError::Vcs {
            operation: "commit".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(killed.to_string().contains("exit code none"));
    }

    #[test]
    fn test_external_tool_message() {
        let err = IngestError::ExternalTool {
            tool: "jpegtran".to_string(),
            code: Some(1),
            stderr: "Premature end of JPEG file".to_string(),
        };
        assert_eq!(err.to_string(), "jpegtran failed (exit code 1): Premature end of JPEG file");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: IngestError = io.into();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
