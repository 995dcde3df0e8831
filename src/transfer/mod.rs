//! Remote copy of the library over scp.
//!
//! All audio files in the persistent download directory go to one
//! `user@host:dir/` target in a single scp run. With a password, scp is
//! wrapped in `sshpass -e` and the password travels in the child's
//! `SSHPASS` environment variable; without one, key-based auth is assumed.
//! The scp exit status decides the whole request; there is no per-file
//! accounting.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::TransferRequest;
use crate::process::{Executor, ProcessError};
use crate::scanner;

const MISSING_FIELDS: &str = "Server user, host, and directory are required";
const NO_FILES: &str = "No audio files found to transfer";

/// A validated copy destination.
#[derive(Clone, PartialEq, Eq)]
pub struct TransferTarget {
    pub user: String,
    pub host: String,
    pub dir: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for TransferTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferTarget")
            .field("user", &self.user)
            .field("host", &self.host)
            .field("dir", &self.dir)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl TransferTarget {
    /// Validate a request. Blank fields are missing; a leading `-` would be
    /// read by scp as an option.
    pub fn from_request(request: &TransferRequest) -> Result<Self> {
        let field = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let (Some(user), Some(host), Some(dir)) = (
            field(&request.server_user),
            field(&request.server_host),
            field(&request.server_dir),
        ) else {
            return Err(Error::validation(MISSING_FIELDS));
        };

        for (name, value) in [("user", &user), ("host", &host), ("directory", &dir)] {
            if value.starts_with('-') {
                return Err(Error::validation(format!("Server {} must not start with '-'", name)));
            }
        }

        Ok(Self {
            user,
            host,
            dir,
            password: request.server_pass.clone().filter(|p| !p.is_empty()),
        })
    }

    /// `user@host:dir` for messages
    pub fn display(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.dir)
    }

    /// scp destination, always a directory
    pub fn destination(&self) -> String {
        format!("{}/", self.display().trim_end_matches('/'))
    }
}

/// Copies files to a remote target.
#[async_trait]
pub trait Transferer: Send + Sync {
    /// Non-zero exit maps to [`Error::TransferFailed`].
    async fn transfer(&self, files: &[PathBuf], target: &TransferTarget) -> Result<()>;
}

/// scp (optionally via sshpass) child-process transferer.
pub struct ScpTransfer {
    scp: PathBuf,
    sshpass: PathBuf,
    timeout: Duration,
}

impl ScpTransfer {
    pub fn new(scp: impl Into<PathBuf>, sshpass: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            scp: scp.into(),
            sshpass: sshpass.into(),
            timeout,
        }
    }

    fn command(&self, files: &[PathBuf], target: &TransferTarget) -> Executor {
        let mut scp_args: Vec<String> = files
            .iter()
            .map(|f| f.to_string_lossy().into_owned())
            .collect();
        scp_args.push(target.destination());

        match target.password {
            Some(ref password) => {
                let mut args = vec!["-e".to_string(), self.scp.to_string_lossy().into_owned()];
                args.extend(scp_args);
                Executor::new(&self.sshpass, args, self.timeout).env("SSHPASS", password.clone())
            }
            None => Executor::new(&self.scp, scp_args, self.timeout),
        }
    }

    /// scp has no version flag; being able to start it is enough
    pub async fn scp_available(&self) -> bool {
        Executor::new(&self.scp, Vec::new(), Duration::from_secs(10))
            .execute()
            .await
            .is_ok()
    }

    pub async fn sshpass_available(&self) -> bool {
        crate::process::is_available(&self.sshpass, "-V").await
    }
}

#[async_trait]
impl Transferer for ScpTransfer {
    async fn transfer(&self, files: &[PathBuf], target: &TransferTarget) -> Result<()> {
        let executor = self.command(files, target);

        let output = executor.execute().await.map_err(|e| match e {
            ProcessError::Timeout(after) => Error::Timeout {
                tool: executor.program_name(),
                after,
            },
            other => Error::TransferFailed {
                stderr: other.to_string(),
            },
        })?;

        if !output.success() {
            tracing::error!("Transfer error: {}", output.failure_text());
            return Err(Error::TransferFailed {
                stderr: output.failure_text(),
            });
        }
        Ok(())
    }
}

/// Result of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub message: String,
    pub files: Vec<String>,
}

/// Validates, lists the library and hands it to a [`Transferer`].
#[derive(Clone)]
pub struct TransferService {
    transferer: Arc<dyn Transferer>,
    download_dir: PathBuf,
}

impl TransferService {
    pub fn new(transferer: Arc<dyn Transferer>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            transferer,
            download_dir: download_dir.into(),
        }
    }

    pub async fn run(&self, request: &TransferRequest) -> Result<TransferOutcome> {
        let target = TransferTarget::from_request(request)?;
        let files = self.library_files().await?;
        if files.is_empty() {
            return Err(Error::validation(NO_FILES));
        }

        tracing::info!(count = files.len(), target = %target.display(), "Transferring");
        let paths: Vec<PathBuf> = files.iter().map(|f| self.download_dir.join(f)).collect();
        self.transferer.transfer(&paths, &target).await?;

        let message = format!("Transferred {} files to {}", files.len(), target.display());
        tracing::info!("{}", message);
        Ok(TransferOutcome { message, files })
    }

    async fn library_files(&self) -> Result<Vec<String>> {
        if !tokio::fs::try_exists(&self.download_dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        scanner::audio_names_sorted(&self.download_dir).await
    }
}
