//! Templates embedded into the binary.
//!
//! The deployer never reads its own templates from disk at runtime; every
//! file under `templates/` is baked in at compile time.

use crate::core::error::DeployError;
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.json"]
struct Templates;

pub const HOST_CONFIG_TEMPLATE: &str = "opencode.json";

pub fn get_template(name: &str) -> Option<Vec<u8>> {
    Templates::get(name).map(|file| file.data.into_owned())
}

/// Host configuration that disables the host's built-in agents.
pub fn host_config() -> Result<Vec<u8>, DeployError> {
    get_template(HOST_CONFIG_TEMPLATE).ok_or_else(|| {
        DeployError::NotFound(format!("embedded template {}", HOST_CONFIG_TEMPLATE))
    })
}
