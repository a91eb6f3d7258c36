//! Configuration module for Stevedore
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (STEVEDORE_*)
//! 3. Explicit --config path, else ./stevedore.toml, else
//!    ~/.config/stevedore/config.toml
//!
//! The auth secret is only ever read from STEVEDORE_AUTH_SECRET. It has no
//! place in the config file and is never written back out.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactSpec;
use crate::error::{DeployError, DeployResult};
use crate::target::{AuthSecret, DeployTarget};

/// Environment variable holding the auth secret
pub const AUTH_SECRET_ENV: &str = "STEVEDORE_AUTH_SECRET";

/// Target host configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TargetConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub user: String,
}

/// Transfer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Remote directory artifacts are copied into
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,

    /// Add `-o StrictHostKeyChecking=no` to scp/ssh commands
    #[serde(default)]
    pub insecure_host_key: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            remote_dir: default_remote_dir(),
            insecure_host_key: false,
        }
    }
}

fn default_remote_dir() -> String {
    "/tmp".to_string()
}

/// One `[[artifacts]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub path: PathBuf,

    #[serde(default = "default_true")]
    pub required: bool,

    /// Marks the install script executed after transfer
    #[serde(default)]
    pub install: bool,
}

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub transfer: TransferConfig,

    #[serde(default)]
    pub artifacts: Vec<ArtifactConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> DeployResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| DeployError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        toml::from_str(&content).map_err(|e| DeployError::Config {
            message: format!("invalid config {}: {}", path.display(), e),
        })
    }

    /// Resolve the config file: explicit path, ./stevedore.toml, then the
    /// user config directory.
    pub fn discover(explicit: Option<&Path>) -> DeployResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from("stevedore.toml");
        if local.exists() {
            return Self::load(&local);
        }

        if let Some(dir) = dirs::config_dir() {
            let user = dir.join("stevedore/config.toml");
            if user.exists() {
                return Self::load(&user);
            }
        }

        Err(DeployError::Config {
            message: "no configuration found - create stevedore.toml or pass --config"
                .to_string(),
        })
    }

    /// Apply STEVEDORE_* environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("STEVEDORE_HOST") {
            if !host.is_empty() {
                self.target.host = host;
            }
        }
        if let Ok(user) = std::env::var("STEVEDORE_USER") {
            if !user.is_empty() {
                self.target.user = user;
            }
        }
        if let Ok(dir) = std::env::var("STEVEDORE_REMOTE_DIR") {
            if !dir.is_empty() {
                self.transfer.remote_dir = dir;
            }
        }
    }

    /// Validate the configuration; violations are fatal at startup
    pub fn validate(&self) -> DeployResult<()> {
        if self.target.host.is_empty() {
            return Err(config_error("target.host is not set"));
        }
        if self.target.user.is_empty() {
            return Err(config_error("target.user is not set"));
        }
        if self.artifacts.is_empty() {
            return Err(config_error("no artifacts configured"));
        }
        if self.artifacts.iter().filter(|a| a.install).count() > 1 {
            return Err(config_error("more than one artifact marked install"));
        }
        for artifact in &self.artifacts {
            if artifact.path.file_name().is_none() {
                return Err(config_error(&format!(
                    "artifact path has no file name: {}",
                    artifact.path.display()
                )));
            }
        }
        Ok(())
    }

    /// Build the deployment target, picking the secret up from the
    /// environment if present
    pub fn target(&self) -> DeployTarget {
        let target = DeployTarget::new(&self.target.host, &self.target.user);
        match std::env::var(AUTH_SECRET_ENV) {
            Ok(secret) if !secret.is_empty() => target.with_secret(AuthSecret::new(secret)),
            _ => target,
        }
    }

    /// Expand `[[artifacts]]` entries into specs with remote paths.
    ///
    /// When no entry is marked `install = true`, the last one is treated as
    /// the install script (matching the conventional archive-then-script
    /// ordering).
    pub fn artifact_specs(&self) -> Vec<ArtifactSpec> {
        let has_install = self.artifacts.iter().any(|a| a.install);
        let remote_dir = self.transfer.remote_dir.trim_end_matches('/');
        let last = self.artifacts.len().saturating_sub(1);

        self.artifacts
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let file_name = a
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ArtifactSpec {
                    local_path: a.path.clone(),
                    remote_path: format!("{}/{}", remote_dir, file_name),
                    required: a.required,
                    install: if has_install { a.install } else { i == last },
                }
            })
            .collect()
    }
}

fn config_error(message: &str) -> DeployError {
    DeployError::Config {
        message: message.to_string(),
    }
}
