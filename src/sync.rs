//! # Sync Gate Module
//!
//! Questo modulo sincronizza la directory di export con il remote git.
//!
//! ## Responsabilità:
//! - Interroga lo stato del working tree (`git status --porcelain`)
//! - Short-circuit se non ci sono modifiche pendenti
//! - Altrimenti: `git add`, `git commit`, `git push <remote> <branch>`
//!
//! ## Astrazione VCS:
//! - `VcsClient`: trait con le quattro operazioni (status/add/commit/push)
//! - `GitCli`: implementazione reale via `tokio::process::Command`,
//!   sempre con `current_dir` sulla root del repository
//! - I test usano un double che registra le chiamate
//!
//! ## Error handling:
//! - Exit code non-zero in qualsiasi fase termina la sincronizzazione
//! - `git` non eseguibile → `MissingDependency`, rilevato al primo comando
//! - Nessun retry, nessun rollback dei file già esportati
//! - La prossima esecuzione rileva di nuovo lo stato "dirty" e riprova
//!
//! ## Esempio:
//! ```ignore
//! let git = GitCli::new(&config.repo_root);
//! let outcome = SyncGate::from_config(&config).synchronize(&git).await?;
//! ```

use crate::{args, config::Config, error::IngestError, platform::PlatformCommands};
use async_trait::async_trait;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Captured output of a successful VCS invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// The four version-control operations the sync gate needs
#[async_trait]
pub trait VcsClient: Send + Sync {
    /// Machine-readable working tree status; empty when clean
    async fn status(&self) -> Result<CommandOutput, IngestError>;
    /// Stage every change in the working tree
    async fn stage_all(&self) -> Result<CommandOutput, IngestError>;
    async fn commit(&self, message: &str) -> Result<CommandOutput, IngestError>;
    async fn push(&self, remote: &str, branch: &str) -> Result<CommandOutput, IngestError>;
}

/// `VcsClient` backed by the `git` command line tool
pub struct GitCli {
    repo_root: PathBuf,
    program: PathBuf,
}

impl GitCli {
    pub fn new(repo_root: &Path) -> Self {
        Self::with_program(repo_root, PlatformCommands::instance().get_tool_path("git"))
    }

    /// Use a specific git executable instead of the one found on PATH
    pub fn with_program(repo_root: &Path, program: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
            program: program.into(),
        }
    }

    async fn run(&self, operation: &str, args: Vec<String>) -> Result<CommandOutput, IngestError> {
        debug!("Running git {} in {}", args.join(" "), self.repo_root.display());

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.repo_root)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => IngestError::MissingDependency(self.program.display().to_string()),
                _ => IngestError::Io(e),
            })?;

        let captured = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            return Err(IngestError::Vcs {
                operation: operation.to_string(),
                code: output.status.code(),
                stderr: captured.stderr.trim().to_string(),
            });
        }

        Ok(captured)
    }
}

#[async_trait]
impl VcsClient for GitCli {
    async fn status(&self) -> Result<CommandOutput, IngestError> {
        self.run("status", args!["status", "--porcelain"]).await
    }

    async fn stage_all(&self) -> Result<CommandOutput, IngestError> {
        self.run("add", args!["add", "--all", "."]).await
    }

    async fn commit(&self, message: &str) -> Result<CommandOutput, IngestError> {
        self.run("commit", args!["commit", "-m", message]).await
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<CommandOutput, IngestError> {
        self.run("push", args!["push", remote, branch]).await
    }
}

/// Result of a sync attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Nothing pending; no stage/commit/push issued
    Clean,
    /// Changes were committed and pushed
    Pushed,
}

/// Change-detection-gated commit and push
#[derive(Debug, Clone)]
pub struct SyncGate {
    remote: String,
    branch: String,
    commit_message: String,
}

impl SyncGate {
    pub fn new(remote: impl Into<String>, branch: impl Into<String>, commit_message: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            branch: branch.into(),
            commit_message: commit_message.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.remote, &config.branch, &config.commit_message)
    }

    /// Commit and push pending changes, or do nothing when the tree is clean
    pub async fn synchronize(&self, vcs: &dyn VcsClient) -> Result<SyncOutcome, IngestError> {
        let status = vcs.status().await?;
        if status.stdout.trim().is_empty() {
            info!("Working tree clean: nothing to synchronize");
            return Ok(SyncOutcome::Clean);
        }

        let pending = status.stdout.lines().filter(|l| !l.trim().is_empty()).count();
        info!("Synchronizing {} pending change(s) to {}/{}", pending, self.remote, self.branch);

        vcs.stage_all().await?;
        debug!("Staged all changes");

        vcs.commit(&self.commit_message).await?;
        info!("Committed: {}", self.commit_message);

        vcs.push(&self.remote, &self.branch).await?;
        info!("Pushed to {}/{}", self.remote, self.branch);

        Ok(SyncOutcome::Pushed)
    }
}

/// Recording `VcsClient` double shared by the test modules
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;

    pub(crate) struct MockVcs {
        status_output: String,
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl MockVcs {
        pub(crate) fn clean() -> Self {
            Self::with_status("")
        }

        pub(crate) fn with_status(status: &str) -> Self {
            Self {
                status_output: status.to_string(),
                fail_on: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing_on(mut self, operation: &'static str) -> Self {
            self.fail_on = Some(operation);
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String, operation: &str) -> Result<CommandOutput, IngestError> {
            self.calls.lock().unwrap().push(call);
            if self.fail_on == Some(operation) {
                return Err(IngestError::Vcs {
                    operation: operation.to_string(),
                    code: Some(1),
                    stderr: format!("{} rejected", operation),
                });
            }
            Ok(CommandOutput::default())
        }
    }

    #[async_trait]
    impl VcsClient for MockVcs {
        async fn status(&self) -> Result<CommandOutput, IngestError> {
            self.record("status".to_string(), "status")?;
            Ok(CommandOutput {
                stdout: self.status_output.clone(),
                stderr: String::new(),
            })
        }

        async fn stage_all(&self) -> Result<CommandOutput, IngestError> {
            self.record("add".to_string(), "add")
        }

        async fn commit(&self, message: &str) -> Result<CommandOutput, IngestError> {
            self.record(format!("commit {}", message), "commit")
        }

        async fn push(&self, remote: &str, branch: &str) -> Result<CommandOutput, IngestError> {
            self.record(format!("push {} {}", remote, branch), "push")
        }
    }
}
