//! Deployment plan - separates step derivation from step execution
//!
//! Stage 1: build_plan() - pure, derives ordered steps from validated artifacts
//! Stage 2: describe_plan() / execute_plan() - report for manual use, or run
//!
//! A plan is only ever constructed after validation succeeds, and it is
//! immutable once built. Rendered commands never contain the auth secret;
//! they reference the target by its `user@host` login only.

use std::path::PathBuf;

use crate::artifact::ArtifactMeta;
use crate::target::DeployTarget;

/// One atomic unit of the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployStep {
    /// Copy a local file to the remote host
    Transfer { local: PathBuf, remote: String },
    /// Run a command on the remote host
    RemoteExecute { command: String },
}

impl DeployStep {
    /// Render the step as a shell-ready scp/ssh command line
    pub fn render(&self, login: &str, insecure_host_key: bool) -> String {
        let opts = if insecure_host_key {
            " -o StrictHostKeyChecking=no"
        } else {
            ""
        };
        match self {
            DeployStep::Transfer { local, remote } => format!(
                "scp -p{} {} {}",
                opts,
                shell_word(&local.display().to_string()),
                shell_word(&format!("{}:{}", login, remote)),
            ),
            DeployStep::RemoteExecute { command } => {
                format!("ssh{} {} {}", opts, login, shell_word(command))
            }
        }
    }
}

/// Plan construction options
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Add `-o StrictHostKeyChecking=no` to every scp/ssh command
    pub insecure_host_key: bool,
}

/// The ordered, immutable sequence of steps derived from target + artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    login: String,
    insecure_host_key: bool,
    steps: Vec<DeployStep>,
}

impl DeployPlan {
    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn steps(&self) -> &[DeployStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render one step as a command line
    pub fn render_step(&self, step: &DeployStep) -> String {
        step.render(&self.login, self.insecure_host_key)
    }
}

/// Derive the deployment plan: transfer each artifact in input order, then
/// make the install script executable and run it.
///
/// Pure function - no I/O, deterministic for identical inputs. The install
/// step targets the last artifact flagged as the install script; a plan
/// without one is transfer-only.
pub fn build_plan(
    target: &DeployTarget,
    artifacts: &[ArtifactMeta],
    options: &PlanOptions,
) -> DeployPlan {
    let mut steps: Vec<DeployStep> = artifacts
        .iter()
        .map(|meta| DeployStep::Transfer {
            local: meta.spec.local_path.clone(),
            remote: meta.spec.remote_path.clone(),
        })
        .collect();

    if let Some(install) = artifacts.iter().rev().find(|m| m.spec.install) {
        let script = &install.spec.remote_path;
        steps.push(DeployStep::RemoteExecute {
            command: format!("chmod +x {} && {}", script, script),
        });
    }

    DeployPlan {
        login: target.login(),
        insecure_host_key: options.insecure_host_key,
        steps,
    }
}

/// Produce one human-readable command line per step, for display or
/// manual execution by the operator. Never contains the auth secret.
pub fn describe_plan(plan: &DeployPlan) -> Vec<String> {
    plan.steps.iter().map(|s| plan.render_step(s)).collect()
}

/// Quote a string for shell use, leaving plain path-like words bare
fn shell_word(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "./-_@:+=%,~".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}
