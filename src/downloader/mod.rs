//! External media downloader integration (yt-dlp).
//!
//! - [`args`] translates a [`DownloadRequest`](crate::model::DownloadRequest)
//!   into downloader flags
//! - [`Downloader`] is the seam the pipeline calls; [`YtDlp`] runs the real
//!   tool through [`Executor`], tests substitute a mock that drops files

pub mod args;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::process::{Executor, ProcessError};

pub use args::build_args;

/// Everything needed for one downloader run.
#[derive(Debug, Clone)]
pub struct DownloadInvocation {
    /// Flags from [`build_args`]
    pub args: Vec<String>,
    /// Source URL, passed after `--`
    pub url: String,
    /// Directory the tool writes into
    pub work_dir: PathBuf,
}

/// Runs an external downloader.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Run to completion. Non-zero exit maps to [`Error::DownloadFailed`].
    async fn download(&self, invocation: &DownloadInvocation) -> Result<()>;
}

/// yt-dlp child-process downloader.
pub struct YtDlp {
    program: PathBuf,
    timeout: Duration,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Full argument vector: flags, `--`, URL.
    fn command_args(invocation: &DownloadInvocation) -> Vec<String> {
        let mut args = invocation.args.clone();
        args.push("--".to_string());
        args.push(invocation.url.clone());
        args
    }

    pub async fn is_available(&self) -> bool {
        crate::process::is_available(&self.program, "--version").await
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn download(&self, invocation: &DownloadInvocation) -> Result<()> {
        let executor = Executor::new(&self.program, Self::command_args(invocation), self.timeout);

        let output = executor.execute().await.map_err(|e| match e {
            ProcessError::Timeout(after) => Error::Timeout {
                tool: executor.program_name(),
                after,
            },
            other => Error::DownloadFailed {
                stderr: other.to_string(),
            },
        })?;

        if !output.success() {
            tracing::error!("Download error: {}", output.failure_text());
            return Err(Error::DownloadFailed {
                stderr: output.failure_text(),
            });
        }

        tracing::debug!("yt-dlp finished: {}", output.stdout.trim());
        Ok(())
    }
}
