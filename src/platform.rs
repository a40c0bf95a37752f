//! # Platform-specific utilities
//!
//! Questo modulo centralizza la risoluzione cross-platform dei comandi
//! esterni usati dalla pipeline: `git` per la sincronizzazione e `jpegtran`
//! per l'ottimizzazione entropica dei JPEG.
//!
//! La disponibilità di un tool si verifica lanciando il tool stesso, senza
//! dipendere da `which`/`where`.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::OnceLock;
use tracing::debug;

/// Platform-specific command manager
pub struct PlatformCommands {
    commands: HashMap<&'static str, &'static str>,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        let mut commands = HashMap::new();
        if cfg!(windows) {
            commands.insert("git", "git.exe");
            commands.insert("jpegtran", "jpegtran.exe");
        } else {
            commands.insert("git", "git");
            commands.insert("jpegtran", "jpegtran");
        }

        Self { commands }
    }

    /// Get the platform-specific command name
    pub fn get_command<'a>(&self, base_name: &'a str) -> &'a str {
        self.commands.get(base_name).copied().unwrap_or(base_name)
    }

    /// Path (or bare name resolved through PATH) used to spawn a tool
    pub fn get_tool_path(&self, base_name: &str) -> PathBuf {
        PathBuf::from(self.get_command(base_name))
    }

    /// Check if a command can be spawned on this system.
    ///
    /// Only a spawn failure counts as missing; the exit status of the
    /// probe invocation is ignored.
    pub async fn is_command_available(&self, base_name: &str) -> bool {
        let command_name = self.get_command(base_name);

        let result = tokio::process::Command::new(command_name)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        let available = match result {
            Ok(_) => true,
            Err(ref e) if e.kind() == ErrorKind::NotFound => false,
            Err(ref e) => {
                debug!("Probing {} failed: {}", command_name, e);
                false
            }
        };
        debug!("Command {} available: {}", command_name, available);
        available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_commands() {
        let platform = PlatformCommands::instance();

        let git = platform.get_command("git");
        if cfg!(windows) {
            assert_eq!(git, "git.exe");
            assert_eq!(platform.get_command("jpegtran"), "jpegtran.exe");
        } else {
            assert_eq!(git, "git");
            assert_eq!(platform.get_command("jpegtran"), "jpegtran");
        }

        // unknown tools pass through unchanged
        assert_eq!(platform.get_command("svn"), "svn");
        assert_eq!(platform.get_tool_path("svn"), PathBuf::from("svn"));
    }

    #[tokio::test]
    async fn test_missing_command_is_unavailable() {
        let platform = PlatformCommands::instance();
        assert!(!platform.is_command_available("surely-not-a-real-tool-4c1e").await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawnable_command_is_available() {
        // `sh` rejects --version on some systems; only the spawn matters
        assert!(PlatformCommands::instance().is_command_available("sh").await);
    }
}
