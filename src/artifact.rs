//! Artifact validation - the precondition stage of a deployment.
//!
//! Stats every configured artifact in input order and fails fast on the
//! first missing required file. Successful validation yields metadata
//! (size, sha256 digest) used for reporting and plan construction.

use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::error::{DeployError, DeployResult};

/// A local file that must exist before deployment can proceed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    /// Path to the local file, relative to the working directory or absolute
    pub local_path: PathBuf,
    /// Destination path on the remote host
    pub remote_path: String,
    /// Missing required artifacts abort validation; optional ones are skipped
    pub required: bool,
    /// Whether this artifact is the install script run after transfer
    pub install: bool,
}

/// Metadata for a validated artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMeta {
    pub spec: ArtifactSpec,
    pub size_bytes: u64,
    pub sha256: String,
}

impl ArtifactMeta {
    /// Human-readable size, e.g. "2.0 KB"
    pub fn size_display(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Validate artifacts in input order, short-circuiting on the first
/// missing required file.
///
/// Missing optional artifacts are excluded from the result rather than
/// reported as errors. Metadata order matches input order.
pub fn validate_artifacts(specs: &[ArtifactSpec]) -> DeployResult<Vec<ArtifactMeta>> {
    let mut metas = Vec::with_capacity(specs.len());

    for spec in specs {
        let metadata = match fs::metadata(&spec.local_path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if spec.required {
                    return Err(DeployError::MissingArtifact {
                        path: spec.local_path.clone(),
                    });
                }
                continue;
            }
            Err(e) => return Err(DeployError::Io(e)),
        };

        let content = fs::read(&spec.local_path)?;
        metas.push(ArtifactMeta {
            spec: spec.clone(),
            size_bytes: metadata.len(),
            sha256: hash_bytes(&content),
        });
    }

    Ok(metas)
}

/// sha256 digest as lowercase hex
fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Format a byte count the way the deployment summary prints it
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
