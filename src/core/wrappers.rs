//! Wrapper agent generation.
//!
//! Each wrapped role gets a small markdown file under the agents directory:
//! YAML front matter describing how the host should run the agent, then a
//! single `{file:...}` reference to the role document. The reference is a
//! `/`-separated path relative to the agents directory so the wrappers keep
//! working when the project is moved or checked out on another platform.

use crate::core::assets;
use crate::core::digest::FileChange;
use crate::core::error::DeployError;
use crate::core::fs::{self, FileSystem};
use crate::core::manifest::{self, Document};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentMode {
    Primary,
    Subagent,
}

impl AgentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentMode::Primary => "primary",
            AgentMode::Subagent => "subagent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capabilities {
    /// May only delegate to the subagent roles.
    Delegate,
    ReadOnly,
    Full,
}

#[derive(Debug, Clone, Copy)]
pub struct RoleProfile {
    pub document: Document,
    pub description: &'static str,
    pub mode: AgentMode,
    /// Rendered verbatim so `0.0` keeps its decimal point.
    pub temperature: &'static str,
    pub capabilities: Capabilities,
    pub hidden: bool,
}

pub const ROLES: [RoleProfile; 6] = [
    RoleProfile {
        document: manifest::CONDUCTOR,
        description: "Final arbiter. Controls iteration and termination.",
        mode: AgentMode::Primary,
        temperature: "0.0",
        capabilities: Capabilities::Delegate,
        hidden: false,
    },
    RoleProfile {
        document: manifest::ANALYST,
        description: "Defines problem boundaries and verifiability. No solutions.",
        mode: AgentMode::Subagent,
        temperature: "0.1",
        capabilities: Capabilities::ReadOnly,
        hidden: true,
    },
    RoleProfile {
        document: manifest::PLANNER,
        description: "Produces executable tasks without implementation details.",
        mode: AgentMode::Subagent,
        temperature: "0.1",
        capabilities: Capabilities::ReadOnly,
        hidden: true,
    },
    RoleProfile {
        document: manifest::IMPLEMENTER,
        description: "Executes tasks exactly as specified. No scope expansion.",
        mode: AgentMode::Subagent,
        temperature: "0.2",
        capabilities: Capabilities::Full,
        hidden: true,
    },
    RoleProfile {
        document: manifest::REVIEWER,
        description: "Validates compliance only. No suggestions.",
        mode: AgentMode::Subagent,
        temperature: "0.1",
        capabilities: Capabilities::ReadOnly,
        hidden: true,
    },
    RoleProfile {
        document: manifest::TESTER,
        description: "Provides reproducible evidence only.",
        mode: AgentMode::Subagent,
        temperature: "0.1",
        capabilities: Capabilities::ReadOnly,
        hidden: true,
    },
];

impl RoleProfile {
    pub fn file_name(&self) -> String {
        format!("{}.md", self.document.key)
    }

    /// Full wrapper text for this role pointing at `reference`.
    pub fn render(&self, reference: &str) -> String {
        let mut out = String::from("---\n");
        let _ = writeln!(out, "description: {}", self.description);
        let _ = writeln!(out, "mode: {}", self.mode.as_str());
        let _ = writeln!(out, "temperature: {}", self.temperature);
        match self.capabilities {
            Capabilities::Delegate => {
                out.push_str("permission:\n  task:\n    \"*\": deny\n");
                for role in manifest::SUBAGENT_ROLES {
                    let _ = writeln!(out, "    {}: allow", role);
                }
            }
            Capabilities::ReadOnly | Capabilities::Full => {
                let allowed = self.capabilities == Capabilities::Full;
                out.push_str("tools:\n");
                for tool in ["write", "edit", "bash"] {
                    let _ = writeln!(out, "  {}: {}", tool, allowed);
                }
            }
        }
        if self.hidden {
            out.push_str("hidden: true\n");
        }
        let _ = write!(out, "---\n\n{{file:{}}}\n", reference);
        out
    }
}

/// `/`-joined path from `from_dir` to `to_file`, computed on normalized
/// components. Falls back to the absolute target when the two share no
/// root (different drives).
pub fn relative_reference(from_dir: &Path, to_file: &Path) -> String {
    let from = fs::normalize(from_dir);
    let to = fs::normalize(to_file);
    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 && (from.has_root() || to.has_root()) {
        return to.to_string_lossy().replace('\\', "/");
    }

    let mut segments: Vec<String> = Vec::new();
    segments.extend(from_parts[common..].iter().map(|_| "..".to_string()));
    segments.extend(
        to_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "change", rename_all = "lowercase")]
pub enum WriteStatus {
    Written(FileChange),
    /// Present already and left untouched.
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub status: WriteStatus,
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub overwrite: bool,
    pub builtin_config: bool,
    pub host_config_path: PathBuf,
}

/// Write `contents` to `path` unless it exists and `overwrite` is off.
pub fn write_unless_exists(
    fs: &dyn FileSystem,
    path: &Path,
    contents: &[u8],
    overwrite: bool,
) -> Result<WriteOutcome, DeployError> {
    if fs.exists(path) && !overwrite {
        return Ok(WriteOutcome {
            path: path.to_path_buf(),
            status: WriteStatus::Exists,
        });
    }
    let previous = if fs.is_file(path) {
        Some(fs.read(path)?)
    } else {
        None
    };
    let change = FileChange::classify(previous.as_deref(), contents);
    if let Some(parent) = path.parent() {
        fs.create_dir_all(parent)?;
    }
    fs.write(path, contents)?;
    Ok(WriteOutcome {
        path: path.to_path_buf(),
        status: WriteStatus::Written(change),
    })
}

/// Emit the six wrappers (and the host configuration when enabled).
/// Outcomes are returned in role order, host configuration last.
pub fn generate(
    fs: &dyn FileSystem,
    effective_root: &Path,
    agents_dir: &Path,
    options: &GenerateOptions,
) -> Result<Vec<WriteOutcome>, DeployError> {
    fs.create_dir_all(agents_dir)?;

    let mut outcomes = Vec::with_capacity(ROLES.len() + 1);
    for role in &ROLES {
        let reference =
            relative_reference(agents_dir, &effective_root.join(role.document.rel_path));
        let path = agents_dir.join(role.file_name());
        outcomes.push(write_unless_exists(
            fs,
            &path,
            role.render(&reference).as_bytes(),
            options.overwrite,
        )?);
    }

    if options.builtin_config {
        let template = assets::host_config()?;
        outcomes.push(write_unless_exists(
            fs,
            &options.host_config_path,
            &template,
            options.overwrite,
        )?);
    }
    Ok(outcomes)
}
