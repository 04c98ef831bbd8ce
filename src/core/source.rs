//! Source resolution.
//!
//! Resolution is an ordered list of named strategies. Each strategy looks at
//! the [`ResolveContext`] and either passes (`None`) or yields a definitive
//! [`SourceDescriptor`]; the first definitive answer wins. A strategy that
//! yields a root has already validated it.
//!
//! | # | strategy         | yields                                    |
//! |---|------------------|-------------------------------------------|
//! | 1 | `explicit`       | `Explicit` / `ExplicitInvalid`            |
//! | 2 | `environment`    | `Environment` / `EnvironmentInvalid`      |
//! | 3 | `global-default` | `Global` (global mode only)               |
//! | 4 | `project-vendor` | `ProjectVendor` (project mode only)       |
//! | 5 | `remote`         | `Downloaded` / `None`                     |

use crate::core::fetch::{AcquireOutcome, OriginFailure, RemoteFetcher};
use crate::core::fs::{self, FileSystem};
use crate::core::target::{InstallMode, InstallTarget};
use crate::core::validate;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Explicit,
    ExplicitInvalid,
    Environment,
    EnvironmentInvalid,
    ProjectVendor,
    Global,
    Downloaded,
    /// Not produced by the built-in strategies: exhausted origins resolve
    /// to `None` with the failures attached.
    DownloadFailed,
    /// Nothing usable: git is missing, or every origin failed.
    None,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Explicit => "explicit",
            SourceKind::ExplicitInvalid => "explicit-invalid",
            SourceKind::Environment => "environment",
            SourceKind::EnvironmentInvalid => "environment-invalid",
            SourceKind::ProjectVendor => "project-vendor",
            SourceKind::Global => "global",
            SourceKind::Downloaded => "downloaded",
            SourceKind::DownloadFailed => "download-failed",
            SourceKind::None => "none",
        }
    }

    /// Kinds that carry a validated root.
    pub fn has_root(self) -> bool {
        !matches!(
            self,
            SourceKind::None
                | SourceKind::ExplicitInvalid
                | SourceKind::EnvironmentInvalid
                | SourceKind::DownloadFailed
        )
    }

    /// Whether a source of this kind is already at its final destination.
    /// Downloads are cloned straight into the target, and the vendor
    /// directory is the project target itself.
    pub fn in_place(self) -> bool {
        matches!(self, SourceKind::ProjectVendor | SourceKind::Downloaded)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolution.
///
/// `root` is present iff `kind.has_root()`; the constructors are the only
/// way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    kind: SourceKind,
    root: Option<PathBuf>,
    /// Operator input for explicit/environment kinds, repository URL for
    /// downloads.
    origin: Option<String>,
    #[serde(skip)]
    failures: Vec<OriginFailure>,
}

impl SourceDescriptor {
    pub(crate) fn resolved(kind: SourceKind, root: PathBuf, origin: Option<String>) -> Self {
        debug_assert!(kind.has_root());
        SourceDescriptor {
            kind,
            root: Some(root),
            origin,
            failures: Vec::new(),
        }
    }

    pub(crate) fn unresolved(kind: SourceKind, origin: Option<String>) -> Self {
        debug_assert!(!kind.has_root());
        SourceDescriptor {
            kind,
            root: None,
            origin,
            failures: Vec::new(),
        }
    }

    pub fn none() -> Self {
        Self::unresolved(SourceKind::None, None)
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Per-origin failures collected by the remote strategy.
    pub fn failures(&self) -> &[OriginFailure] {
        &self.failures
    }
}

/// Everything the strategies may look at.
pub struct ResolveContext<'a> {
    pub fs: &'a dyn FileSystem,
    pub working_dir: &'a Path,
    /// Path given on the command line.
    pub explicit: Option<&'a Path>,
    /// Value of the source override environment variable.
    pub environment: Option<&'a Path>,
    pub target: &'a InstallTarget,
    pub origins: &'a [String],
    /// `None` disables the remote strategy (offline resolution).
    pub fetcher: Option<&'a RemoteFetcher<'a>>,
}

impl ResolveContext<'_> {
    fn absolutize(&self, path: &Path) -> PathBuf {
        fs::normalize(&self.working_dir.join(path))
    }
}

pub type Strategy = fn(&ResolveContext<'_>) -> Option<SourceDescriptor>;

/// Resolution order. Earlier entries shadow later ones.
pub const STRATEGIES: [(&str, Strategy); 5] = [
    ("explicit", explicit),
    ("environment", environment),
    ("global-default", global_default),
    ("project-vendor", project_vendor),
    ("remote", remote),
];

pub fn resolve(ctx: &ResolveContext<'_>) -> SourceDescriptor {
    STRATEGIES
        .iter()
        .find_map(|(_, strategy)| strategy(ctx))
        .unwrap_or_else(SourceDescriptor::none)
}

/// Validate an operator-named path. Never falls through: an invalid path
/// is a terminal answer.
fn operator_named(
    ctx: &ResolveContext<'_>,
    path: &Path,
    valid: SourceKind,
    invalid: SourceKind,
) -> SourceDescriptor {
    let origin = Some(path.display().to_string());
    let root = ctx.absolutize(path);
    if validate::validate_source(ctx.fs, &root) {
        SourceDescriptor::resolved(valid, root, origin)
    } else {
        SourceDescriptor::unresolved(invalid, origin)
    }
}

pub fn explicit(ctx: &ResolveContext<'_>) -> Option<SourceDescriptor> {
    let path = ctx.explicit?;
    Some(operator_named(
        ctx,
        path,
        SourceKind::Explicit,
        SourceKind::ExplicitInvalid,
    ))
}

pub fn environment(ctx: &ResolveContext<'_>) -> Option<SourceDescriptor> {
    let path = ctx.environment.filter(|p| !p.as_os_str().is_empty())?;
    Some(operator_named(
        ctx,
        path,
        SourceKind::Environment,
        SourceKind::EnvironmentInvalid,
    ))
}

/// Check the target directory, but only when `mode` is the active one.
fn check_target(
    ctx: &ResolveContext<'_>,
    mode: InstallMode,
    kind: SourceKind,
) -> Option<SourceDescriptor> {
    if ctx.target.mode != mode {
        return None;
    }
    let root = &ctx.target.source_root;
    validate::validate_source(ctx.fs, root)
        .then(|| SourceDescriptor::resolved(kind, root.clone(), None))
}

pub fn global_default(ctx: &ResolveContext<'_>) -> Option<SourceDescriptor> {
    check_target(ctx, InstallMode::Global, SourceKind::Global)
}

pub fn project_vendor(ctx: &ResolveContext<'_>) -> Option<SourceDescriptor> {
    check_target(ctx, InstallMode::Project, SourceKind::ProjectVendor)
}

pub fn remote(ctx: &ResolveContext<'_>) -> Option<SourceDescriptor> {
    let fetcher = ctx.fetcher?;
    let destination = &ctx.target.source_root;
    let descriptor = match fetcher.acquire(ctx.origins, destination) {
        AcquireOutcome::Acquired { origin } => {
            SourceDescriptor::resolved(SourceKind::Downloaded, destination.clone(), Some(origin))
        }
        AcquireOutcome::Exhausted { failures } => SourceDescriptor {
            failures,
            ..SourceDescriptor::none()
        },
        AcquireOutcome::GitUnavailable => SourceDescriptor::none(),
    };
    Some(descriptor)
}
