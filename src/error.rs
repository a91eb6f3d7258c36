//! Error types for Stevedore
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Stevedore operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for Stevedore operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// Required local artifact is absent; validation stops at the first one
    #[error("required artifact not found: {path}")]
    MissingArtifact { path: PathBuf },

    /// A plan step returned nonzero or timed out; remaining steps are not run
    #[error("step {index} failed: {step}")]
    StepFailed {
        /// 1-based position in the plan
        index: usize,
        step: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Missing or invalid configuration, fatal at startup
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Malformed remote spec passed via --remote
    #[error("invalid remote spec '{spec}' - expected user@host")]
    InvalidRemote { spec: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Operator declined the confirmation prompt or cancelled between steps
    #[error("deployment aborted by user")]
    Aborted,
}
