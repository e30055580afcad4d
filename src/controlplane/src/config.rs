/// Control-plane bootstrap configuration
/// Loaded from kubeadm-init.toml
///
/// The `kubeadm init` arguments are fixed and deliberately absent here.
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default file name looked up by [`KubeadmInitConfig::load_or_default`]
pub const CONFIG_FILE_NAME: &str = "kubeadm-init.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubeadmInitConfig {
    /// Message passed to the status reporter when the run starts
    #[serde(default = "default_status_message")]
    pub status_message: String,

    /// Taint keys removed from a single-node cluster (without the trailing `-`)
    #[serde(default = "default_control_plane_taints")]
    pub control_plane_taints: Vec<String>,
}

fn default_status_message() -> String {
    "Starting control-plane 🕹️".to_string()
}

fn default_control_plane_taints() -> Vec<String> {
    vec!["node-role.kubernetes.io/master".to_string()]
}

impl Default for KubeadmInitConfig {
    fn default() -> Self {
        Self {
            status_message: default_status_message(),
            control_plane_taints: default_control_plane_taints(),
        }
    }
}

impl KubeadmInitConfig {
    /// Load and validate configuration from `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: KubeadmInitConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;

        tracing::info!("Loaded kubeadm init config from {:?}", path);
        Ok(config)
    }

    /// Load `kubeadm-init.toml` from `dir`, falling back to defaults when it is absent
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Self::load(&path);
        }

        tracing::warn!("No {} found in {:?}, using defaults", CONFIG_FILE_NAME, dir);
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_plane_taints.is_empty() {
            return Err(ConfigError::Invalid(
                "control_plane_taints must name at least one taint".to_string(),
            ));
        }
        if let Some(bad) = self
            .control_plane_taints
            .iter()
            .find(|t| t.trim().is_empty() || t.ends_with('-'))
        {
            return Err(ConfigError::Invalid(format!(
                "invalid taint key {:?}: must be non-empty and without a trailing '-'",
                bad
            )));
        }
        Ok(())
    }
}
