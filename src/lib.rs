//! Stevedore - single-host deployment sequencer
//!
//! Stevedore checks that the local build artifacts exist, derives an
//! ordered plan (transfer each artifact, then run the install script on
//! the remote host), and either prints the plan for manual execution or
//! executes it through a command runner.

pub mod artifact;
pub mod config;
pub mod error;
pub mod plan;
pub mod runner;
pub mod target;

// Re-exports for convenience
pub use artifact::{validate_artifacts, ArtifactMeta, ArtifactSpec};
pub use config::Config;
pub use error::{DeployError, DeployResult};
pub use plan::{build_plan, describe_plan, DeployPlan, DeployStep, PlanOptions};
pub use runner::{execute_plan, CommandRunner, ExecuteOptions, ExecuteReport, ShellRunner};
pub use target::{AuthSecret, DeployTarget};
