//! Optional per-project deployer configuration.
//!
//! Read from `.opencode/constitution.toml` under the working directory. A
//! missing file is not an error; every field falls back to its default.

use crate::core::error::DeployError;
use crate::core::fetch::{self, DEFAULT_CLONE_TIMEOUT};
use crate::core::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = ".opencode/constitution.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Repositories tried in order by the remote strategy.
    pub origins: Vec<String>,
    pub clone_timeout_secs: u64,
    /// Write the host configuration file alongside the wrappers.
    pub builtin_config: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        DeployConfig {
            origins: fetch::default_origins(),
            clone_timeout_secs: DEFAULT_CLONE_TIMEOUT.as_secs(),
            builtin_config: true,
        }
    }
}

impl DeployConfig {
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }

    fn check(self) -> Result<Self, DeployError> {
        if self.origins.iter().all(|o| o.trim().is_empty()) {
            return Err(DeployError::ConfigError(
                "origins must name at least one repository".to_string(),
            ));
        }
        if self.clone_timeout_secs == 0 {
            return Err(DeployError::ConfigError(
                "clone_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}

pub fn config_path(working_dir: &Path) -> PathBuf {
    working_dir.join(CONFIG_FILE)
}

pub fn parse_config(content: &str) -> Result<DeployConfig, DeployError> {
    let config: DeployConfig =
        toml::from_str(content).map_err(|e| DeployError::ConfigError(e.to_string()))?;
    config.check()
}

pub fn load_config(fs: &dyn FileSystem, working_dir: &Path) -> Result<DeployConfig, DeployError> {
    let path = config_path(working_dir);
    if !fs.exists(&path) {
        return Ok(DeployConfig::default());
    }
    let bytes = fs.read(&path)?;
    let content = String::from_utf8(bytes).map_err(|_| {
        DeployError::ConfigError(format!("{} is not valid UTF-8", path.display()))
    })?;
    parse_config(&content).map_err(|e| match e {
        DeployError::ConfigError(msg) => {
            DeployError::ConfigError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::MemoryFs;

    #[test]
    fn missing_file_yields_defaults() {
        let mem = MemoryFs::new();
        let config = load_config(&mem, Path::new("/work")).unwrap();
        assert_eq!(config, DeployConfig::default());
        assert_eq!(config.origins.len(), 2);
        assert!(config.origins[0].starts_with("https://github.com/"));
        assert_eq!(config.clone_timeout(), Duration::from_secs(60));
        assert!(config.builtin_config);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mem = MemoryFs::new();
        mem.add_file(
            "/work/.opencode/constitution.toml",
            "clone_timeout_secs = 5\nbuiltin_config = false\n",
        );
        let config = load_config(&mem, Path::new("/work")).unwrap();
        assert_eq!(config.clone_timeout_secs, 5);
        assert!(!config.builtin_config);
        assert_eq!(config.origins, fetch::default_origins());
    }

    #[test]
    fn origins_can_be_replaced() {
        let config = parse_config("origins = [\"/srv/mirror.git\"]").unwrap();
        assert_eq!(config.origins, vec!["/srv/mirror.git".to_string()]);
    }

    #[test]
    fn malformed_or_unknown_fields_are_config_errors() {
        for content in [
            "clone_timeout_secs = \"soon\"",
            "origins = [",
            "mirror = \"x\"",
            "origins = []",
            "clone_timeout_secs = 0",
        ] {
            let err = parse_config(content).unwrap_err();
            assert!(matches!(err, DeployError::ConfigError(_)), "{}", content);
        }
    }

    #[test]
    fn load_errors_name_the_file() {
        let mem = MemoryFs::new();
        mem.add_file("/work/.opencode/constitution.toml", "origins = 3");
        let err = load_config(&mem, Path::new("/work")).unwrap_err();
        assert!(err.to_string().contains("constitution.toml"));
    }
}
