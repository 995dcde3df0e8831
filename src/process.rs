//! Child process execution with captured output and a hard deadline.
//!
//! Every external tool (yt-dlp, scp, sshpass) is spawned from an argument
//! vector, never through a shell, so user-supplied URLs, custom flags and
//! credentials cannot be interpolated into a command line.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

/// A command ready to be run.
#[derive(Debug, Clone, PartialEq)]
pub struct Executor {
    /// The program to run (looked up in PATH when relative).
    pub program: PathBuf,
    /// Arguments, passed verbatim.
    pub args: Vec<String>,
    /// Extra environment variables for the child only.
    pub envs: Vec<(String, String)>,
    /// The child is killed once this elapses.
    pub timeout: Duration,
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Best text to report for a failure: stderr, else stdout, else the exit code.
    pub fn failure_text(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to collect process output: {0}")]
    Wait(#[source] std::io::Error),
}

impl Executor {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            envs: Vec::new(),
            timeout,
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Display name of the program, for logs and errors.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Run the command to completion and capture its output.
    ///
    /// A non-zero exit is NOT an error here; callers inspect [`ProcessOutput::success`].
    pub async fn execute(&self) -> Result<ProcessOutput, ProcessError> {
        // Environment values may hold secrets, so only the argument vector is logged.
        tracing::debug!("Executing {} {:?}", self.program.display(), self.args);

        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: self.program_name(),
            source,
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(ProcessError::Wait)?,
            Err(_) => {
                tracing::warn!(
                    "{} timed out after {:?}, killing it",
                    self.program_name(),
                    self.timeout
                );
                return Err(ProcessError::Timeout(self.timeout));
            }
        };

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        })
    }
}

/// Check whether a program can be started and exits successfully with `probe_arg`.
pub async fn is_available(program: &std::path::Path, probe_arg: &str) -> bool {
    Executor::new(program, vec![probe_arg.to_string()], Duration::from_secs(10))
        .execute()
        .await
        .map(|o| o.success())
        .unwrap_or(false)
}
