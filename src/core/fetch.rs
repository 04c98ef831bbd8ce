//! Remote acquisition of a constitution checkout.
//!
//! Origins are tried in order. Each attempt starts from a clean destination,
//! is bounded by a timeout, and is validated immediately after the clone; a
//! failed or invalid attempt leaves nothing behind. When every origin fails
//! the destination is guaranteed absent.

use crate::core::error::DeployError;
use crate::core::fs::FileSystem;
use crate::core::output;
use crate::core::validate;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

pub const DEFAULT_ORIGINS: [&str; 2] = [
    "https://github.com/jabing/agent-constitution.git",
    "https://gitcode.com/jabing/agent-constitution.git",
];

pub const DEFAULT_CLONE_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Version-control client used to materialize a checkout.
pub trait GitClient {
    fn is_available(&self) -> bool;
    fn clone_repo(
        &self,
        origin: &str,
        destination: &Path,
        timeout: Duration,
    ) -> Result<(), DeployError>;
}

/// The `git` executable on the host.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: String,
}

impl Default for SystemGit {
    fn default() -> Self {
        SystemGit {
            program: "git".to_string(),
        }
    }
}

impl SystemGit {
    pub fn with_program(program: impl Into<String>) -> Self {
        SystemGit {
            program: program.into(),
        }
    }
}

impl GitClient for SystemGit {
    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn clone_repo(
        &self,
        origin: &str,
        destination: &Path,
        timeout: Duration,
    ) -> Result<(), DeployError> {
        let start = Instant::now();
        let mut cmd = Command::new(&self.program);
        cmd.args(["clone", "--depth", "1", "--quiet", origin])
            .arg(destination)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        // Own process group, so helpers such as git-remote-https die with it.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let mut child = cmd.spawn().map_err(DeployError::IoError)?;

        loop {
            if child.try_wait().map_err(DeployError::IoError)?.is_some() {
                let output = child.wait_with_output().map_err(DeployError::IoError)?;
                if output.status.success() {
                    return Ok(());
                }
                return Err(DeployError::ValidationError(format!(
                    "git clone exited with {}: {}",
                    output
                        .status
                        .code()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "signal".to_string()),
                    output::compact_line(&String::from_utf8_lossy(&output.stderr), 160)
                )));
            }
            if start.elapsed() > timeout {
                terminate(&mut child);
                return Err(DeployError::ValidationError(format!(
                    "git clone timed out after {}s",
                    timeout.as_secs_f32()
                )));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Kill the clone and everything it spawned, then reap it.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: plain syscall on a process group this process created.
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Why a single origin did not produce a usable checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginFailure {
    pub origin: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// `origin` was cloned and validated at the destination.
    Acquired { origin: String },
    /// Every origin failed; the destination does not exist.
    Exhausted { failures: Vec<OriginFailure> },
    /// No version-control client on the host; no origin was attempted.
    GitUnavailable,
}

pub struct RemoteFetcher<'a> {
    fs: &'a dyn FileSystem,
    git: &'a dyn GitClient,
    timeout: Duration,
}

impl<'a> RemoteFetcher<'a> {
    pub fn new(fs: &'a dyn FileSystem, git: &'a dyn GitClient, timeout: Duration) -> Self {
        RemoteFetcher { fs, git, timeout }
    }

    pub fn acquire(&self, origins: &[String], destination: &Path) -> AcquireOutcome {
        if !self.git.is_available() {
            return AcquireOutcome::GitUnavailable;
        }

        let mut failures = Vec::new();
        for origin in origins {
            output::step(&format!("Cloning from {}", origin));
            match self.try_origin(origin, destination) {
                Ok(()) => {
                    return AcquireOutcome::Acquired {
                        origin: origin.clone(),
                    };
                }
                Err(e) => {
                    output::failure(&format!("{}: {}", origin, e));
                    failures.push(OriginFailure {
                        origin: origin.clone(),
                        reason: e.to_string(),
                    });
                    if let Err(e) = self.discard(destination) {
                        output::failure(&e.to_string());
                    }
                }
            }
        }
        if let Err(e) = self.discard(destination) {
            output::failure(&e.to_string());
            failures.push(OriginFailure {
                origin: destination.display().to_string(),
                reason: e.to_string(),
            });
        }
        AcquireOutcome::Exhausted { failures }
    }

    fn try_origin(&self, origin: &str, destination: &Path) -> Result<(), DeployError> {
        if self.fs.exists(destination) {
            self.fs.remove_dir_all(destination)?;
        }
        if let Some(parent) = destination.parent() {
            self.fs.create_dir_all(parent)?;
        }
        self.git.clone_repo(origin, destination, self.timeout)?;

        let missing = validate::missing_documents(self.fs, destination);
        if !missing.is_empty() {
            return Err(DeployError::ValidationError(format!(
                "checkout is missing {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Remove whatever a failed attempt left at `destination`.
    fn discard(&self, destination: &Path) -> Result<(), DeployError> {
        if self.fs.exists(destination) {
            self.fs.remove_dir_all(destination)?;
        }
        if self.fs.exists(destination) {
            return Err(DeployError::PathError(format!(
                "partial checkout left at {}",
                destination.display()
            )));
        }
        Ok(())
    }
}

pub fn default_origins() -> Vec<String> {
    DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect()
}
