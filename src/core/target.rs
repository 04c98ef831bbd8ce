//! Installation targets.
//!
//! A run installs into exactly one of two shapes: the project-local
//! directory under the working directory, or the global directory under the
//! user's configuration home. The target is fixed before resolution starts
//! so fetch and install destinations are known up front.

use crate::core::error::DeployError;
use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Project-local constitution root, relative to the working directory.
/// Doubles as the vendor directory checked in project mode.
pub const PROJECT_SOURCE_DIR: &str = ".opencode/agent-constitution";
/// Global constitution root, relative to the configuration home.
pub const GLOBAL_SOURCE_DIR: &str = "opencode/agent-constitution";
/// Wrapper agents output directory, relative to the working directory.
pub const AGENTS_DIR: &str = ".opencode/agents";
/// Host configuration file, relative to the working directory.
pub const HOST_CONFIG_FILE: &str = "opencode.json";
/// Environment variable carrying a source root override.
pub const SOURCE_DIR_ENV: &str = "AGENT_CONSTITUTION_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
    Project,
    Global,
}

impl InstallMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InstallMode::Project => "project",
            InstallMode::Global => "global",
        }
    }
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub mode: InstallMode,
    /// Where the constitution documents live once installed.
    pub source_root: PathBuf,
}

impl InstallTarget {
    pub fn project(working_dir: &Path) -> Self {
        InstallTarget {
            mode: InstallMode::Project,
            source_root: working_dir.join(PROJECT_SOURCE_DIR),
        }
    }

    pub fn global(config_home: &Path) -> Self {
        InstallTarget {
            mode: InstallMode::Global,
            source_root: config_home.join(GLOBAL_SOURCE_DIR),
        }
    }

    /// Build the target for `mode`. `env` looks up environment variables so
    /// callers (and tests) decide where the values come from.
    pub fn for_mode(
        mode: InstallMode,
        working_dir: &Path,
        env: impl Fn(&str) -> Option<OsString>,
    ) -> Result<Self, DeployError> {
        match mode {
            InstallMode::Project => Ok(Self::project(working_dir)),
            InstallMode::Global => Ok(Self::global(&config_home(env)?)),
        }
    }
}

/// The user's configuration home.
///
/// `$XDG_CONFIG_HOME` wins when it is set to an absolute path; otherwise
/// `$HOME/.config`, falling back to `%USERPROFILE%\.config`.
pub fn config_home(env: impl Fn(&str) -> Option<OsString>) -> Result<PathBuf, DeployError> {
    if let Some(xdg) = env("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        let xdg = PathBuf::from(xdg);
        if xdg.is_absolute() {
            return Ok(xdg);
        }
    }
    env("HOME")
        .filter(|v| !v.is_empty())
        .or_else(|| env("USERPROFILE").filter(|v| !v.is_empty()))
        .map(|home| PathBuf::from(home).join(".config"))
        .ok_or_else(|| {
            DeployError::PathError(
                "cannot locate the configuration home: HOME is not set".to_string(),
            )
        })
}

/// Wrapper output directory for a working directory.
pub fn agents_dir(working_dir: &Path) -> PathBuf {
    working_dir.join(AGENTS_DIR)
}

pub fn host_config_path(working_dir: &Path) -> PathBuf {
    working_dir.join(HOST_CONFIG_FILE)
}
