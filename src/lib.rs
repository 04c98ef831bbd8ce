//! Constitution Deployer: installs an agent constitution for OpenCode.
//!
//! A run finds a complete copy of the constitution documents, places them
//! where the host can read them, and generates one wrapper agent per role
//! that references the installed document by relative path.
//!
//! # Pipeline
//!
//! 1. **Resolve** (`core::source`): explicit `--source`, then
//!    `AGENT_CONSTITUTION_DIR`, then the directory of the active mode
//!    (global or project vendor), then a shallow clone from the configured
//!    origins. The first strategy with an answer wins.
//! 2. **Install** (`core::install`): copy exactly the manifest documents into
//!    the target unless the source already lives there.
//! 3. **Generate** (`core::wrappers`): write `.opencode/agents/<role>.md` and
//!    optionally `opencode.json`, skipping existing files without `--force`.
//!
//! # Modes
//!
//! - **Project**: `<cwd>/.opencode/agent-constitution`
//! - **Global**: `<config home>/opencode/agent-constitution`
//!
//! Wrappers and the host configuration are always written under the
//! working directory.

pub mod core;

mod cli;

use crate::cli::Cli;
use crate::core::config;
use crate::core::digest::FileChange;
use crate::core::error::DeployError;
use crate::core::fetch::{DEFAULT_ORIGINS, GitClient, RemoteFetcher, SystemGit};
use crate::core::fs::{self, FileSystem, OsFs};
use crate::core::install::{self, InstallReport};
use crate::core::output::{self, BoxStyle, ItemStatus};
use crate::core::prompt;
use crate::core::source::{self, ResolveContext, SourceDescriptor, SourceKind};
use crate::core::target::{self, InstallTarget, SOURCE_DIR_ENV};
use crate::core::validate;
use crate::core::wrappers::{self, GenerateOptions, WriteOutcome, WriteStatus};
use clap::Parser;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything a deployment needs, decided before any side effect.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub working_dir: PathBuf,
    pub target: InstallTarget,
    /// `--source`, as given.
    pub explicit: Option<PathBuf>,
    /// `AGENT_CONSTITUTION_DIR`, as found in the environment.
    pub environment: Option<PathBuf>,
    pub overwrite: bool,
    pub builtin_config: bool,
    pub origins: Vec<String>,
    pub clone_timeout: Duration,
}

#[derive(Debug, Serialize)]
pub struct DeployReport {
    pub source: SourceDescriptor,
    /// Root the wrappers reference.
    pub effective_root: PathBuf,
    pub install: Option<InstallReport>,
    pub outputs: Vec<WriteOutcome>,
}

pub fn run() -> Result<(), DeployError> {
    let cli = Cli::parse();
    let working_dir = std::env::current_dir()?;
    let fs = OsFs;

    let config = config::load_config(&fs, &working_dir)?;

    output::render_box(
        "AGENT CONSTITUTION DEPLOYER",
        &format!("v{}", env!("CARGO_PKG_VERSION")),
        BoxStyle::Info,
    );

    let mode = match cli.mode() {
        Some(mode) => mode,
        None => prompt::ask_mode(&mut io::stdin().lock(), &mut io::stdout())?,
    };
    let env = |key: &str| std::env::var_os(key);
    let target = InstallTarget::for_mode(mode, &working_dir, env)?;

    let request = DeployRequest {
        target,
        explicit: cli.source.clone(),
        environment: env(SOURCE_DIR_ENV).map(PathBuf::from),
        overwrite: cli.force,
        builtin_config: cli
            .builtin_config_override()
            .unwrap_or(config.builtin_config),
        clone_timeout: config.clone_timeout(),
        origins: config.origins,
        working_dir,
    };

    let git = SystemGit::default();
    let report = deploy(&fs, &git, &request)?;
    print_summary(&request, &report);
    Ok(())
}

/// Resolve, install and generate. Prints progress as it goes; the caller
/// owns the final summary.
pub fn deploy(
    fs: &dyn FileSystem,
    git: &dyn GitClient,
    request: &DeployRequest,
) -> Result<DeployReport, DeployError> {
    output::section(&format!("Resolving source ({} mode)", request.target.mode));
    let fetcher = RemoteFetcher::new(fs, git, request.clone_timeout);
    let ctx = ResolveContext {
        fs,
        working_dir: &request.working_dir,
        explicit: request.explicit.as_deref(),
        environment: request.environment.as_deref(),
        target: &request.target,
        origins: &request.origins,
        fetcher: Some(&fetcher),
    };
    let source = source::resolve(&ctx);
    let root = usable_root(fs, git, request, &source)?;
    output::item(
        &format!("{} source at {}", source.kind(), root.display()),
        ItemStatus::Info,
    );

    let destination = &request.target.source_root;
    let (effective_root, install) = if install::needs_install(fs, &source, destination) {
        output::section(&format!("Installing into {}", destination.display()));
        let report = install::install_minimal(fs, &root, destination)?;
        for file in &report.files {
            output::item(file.rel_path, change_status(file.change));
        }
        (destination.clone(), Some(report))
    } else {
        (root, None)
    };

    output::section("Generating wrapper agents");
    let options = GenerateOptions {
        overwrite: request.overwrite,
        builtin_config: request.builtin_config,
        host_config_path: target::host_config_path(&request.working_dir),
    };
    let agents_dir = target::agents_dir(&request.working_dir);
    let outputs = wrappers::generate(fs, &effective_root, &agents_dir, &options)?;
    for outcome in &outputs {
        let name = outcome
            .path
            .strip_prefix(&request.working_dir)
            .unwrap_or(&outcome.path)
            .display()
            .to_string();
        match outcome.status {
            WriteStatus::Written(change) => output::item(&name, change_status(change)),
            WriteStatus::Exists => output::item(
                &format!("{} (exists; pass --force to overwrite)", name),
                ItemStatus::Skipped,
            ),
        }
    }

    Ok(DeployReport {
        source,
        effective_root,
        install,
        outputs,
    })
}

/// Turn a resolution outcome into the root to deploy from, or the error
/// that ends the run.
fn usable_root(
    fs: &dyn FileSystem,
    git: &dyn GitClient,
    request: &DeployRequest,
    source: &SourceDescriptor,
) -> Result<PathBuf, DeployError> {
    match source.kind() {
        SourceKind::Explicit
        | SourceKind::Environment
        | SourceKind::ProjectVendor
        | SourceKind::Global
        | SourceKind::Downloaded => source.root().map(Path::to_path_buf).ok_or_else(|| {
            DeployError::PathError(format!("{} source has no root", source.kind()))
        }),
        SourceKind::ExplicitInvalid => Err(DeployError::InvalidSource(format!(
            "--source {} {}",
            source.origin().unwrap_or_default(),
            incomplete_reason(fs, request, source)
        ))),
        SourceKind::EnvironmentInvalid => Err(DeployError::InvalidSource(format!(
            "{}={} {}",
            SOURCE_DIR_ENV,
            source.origin().unwrap_or_default(),
            incomplete_reason(fs, request, source)
        ))),
        SourceKind::None if source.failures().is_empty() && !git.is_available() => {
            Err(DeployError::Precondition(
                "git is not available; install git or pass --source <PATH>".to_string(),
            ))
        }
        SourceKind::None | SourceKind::DownloadFailed => Err(DeployError::NotFound(
            not_found_message(request, source),
        )),
    }
}

fn incomplete_reason(
    fs: &dyn FileSystem,
    request: &DeployRequest,
    source: &SourceDescriptor,
) -> String {
    let root = fs::normalize(&request.working_dir.join(source.origin().unwrap_or_default()));
    if !fs.exists(&root) {
        return "does not exist".to_string();
    }
    format!(
        "is not a complete constitution (missing: {})",
        validate::missing_documents(fs, &root).join(", ")
    )
}

fn not_found_message(request: &DeployRequest, source: &SourceDescriptor) -> String {
    let mut msg = String::from("no agent constitution could be resolved or downloaded.\n");
    for failure in source.failures() {
        msg.push_str(&format!("  {}: {}\n", failure.origin, failure.reason));
    }
    let origin = request
        .origins
        .first()
        .map(String::as_str)
        .unwrap_or(DEFAULT_ORIGINS[0]);
    msg.push_str("Options:\n");
    msg.push_str("  1. pass --source <PATH> pointing at a local copy\n");
    msg.push_str(&format!(
        "  2. set {} to a local copy\n",
        SOURCE_DIR_ENV
    ));
    msg.push_str(&format!(
        "  3. git clone {} {}\n",
        origin,
        request.target.source_root.display()
    ));
    msg.push_str("  4. check network access and retry");
    msg
}

fn change_status(change: FileChange) -> ItemStatus {
    match change {
        FileChange::Created => ItemStatus::Created,
        FileChange::Updated => ItemStatus::Updated,
        FileChange::Unchanged => ItemStatus::Unchanged,
    }
}

fn print_summary(request: &DeployRequest, report: &DeployReport) {
    let skipped = report
        .outputs
        .iter()
        .filter(|o| o.status == WriteStatus::Exists)
        .count();
    println!();
    output::render_box(
        "CONSTITUTION DEPLOYED",
        &format!("{} mode, source: {}", request.target.mode, report.source.kind()),
        BoxStyle::Success,
    );
    output::item(
        &format!("Constitution: {}", report.effective_root.display()),
        ItemStatus::Info,
    );
    output::item(
        &format!(
            "Wrappers: {}",
            target::agents_dir(&request.working_dir).display()
        ),
        ItemStatus::Info,
    );
    if skipped > 0 {
        output::item(
            &format!("{} existing file(s) kept; rerun with --force to overwrite", skipped),
            ItemStatus::Skipped,
        );
    }
    output::section("Next steps");
    println!("  1. Restart OpenCode");
    println!("  2. Select 'conductor' as your primary agent");
    println!("  3. Talk only to conductor (other agents are hidden subagents)");
}
