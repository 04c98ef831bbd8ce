//! CLI struct definitions for the deployer.

use crate::core::target::InstallMode;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "constitution-deployer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Installs the agent constitution for OpenCode and generates the role wrapper agents that reference it.",
    group(ArgGroup::new("mode").args(["global", "project"])),
    group(ArgGroup::new("host_config").args(["builtin_config", "no_builtin_config"]))
)]
pub(crate) struct Cli {
    /// Overwrite existing wrapper files and host configuration.
    #[clap(long, short = 'f')]
    pub force: bool,
    /// Do not write opencode.json.
    #[clap(long)]
    pub no_builtin_config: bool,
    /// Write opencode.json even if the config file disables it.
    #[clap(long)]
    pub builtin_config: bool,
    /// Constitution source directory (absolute or relative to the working directory).
    #[clap(long, value_name = "PATH")]
    pub source: Option<PathBuf>,
    /// Install into the user-global configuration directory.
    #[clap(long)]
    pub global: bool,
    /// Install into .opencode/ under the working directory.
    #[clap(long)]
    pub project: bool,
}

impl Cli {
    /// Mode chosen by flags; `None` means ask.
    pub fn mode(&self) -> Option<InstallMode> {
        if self.global {
            Some(InstallMode::Global)
        } else if self.project {
            Some(InstallMode::Project)
        } else {
            None
        }
    }

    /// Flag override for the host configuration file, if any.
    pub fn builtin_config_override(&self) -> Option<bool> {
        if self.no_builtin_config {
            Some(false)
        } else if self.builtin_config {
            Some(true)
        } else {
            None
        }
    }
}
