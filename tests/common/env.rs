//! Test environment builder for isolated Stevedore testing.
//!
//! Provides `TestEnv` - an isolated test environment with temp directories
//! for the project and a fake home, plus helpers to run the CLI.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Result of running a Stevedore CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment with temp directories.
///
/// Provides:
/// - Isolated project directory (cwd for the CLI)
/// - Isolated home directory (so user-level config is never picked up)
/// - CLI command execution helpers
pub struct TestEnv {
    /// Temporary directory for the project
    pub project_root: TempDir,
    /// Temporary directory for HOME
    pub home_dir: TempDir,
}

impl TestEnv {
    /// Create a new TestEnvBuilder
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::new()
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Run stevedore in this environment from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run stevedore with extra environment variables
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_stevedore"));
        cmd.current_dir(self.project_root.path())
            .args(args)
            .env("HOME", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"))
            .env_remove("STEVEDORE_HOST")
            .env_remove("STEVEDORE_USER")
            .env_remove("STEVEDORE_REMOTE_DIR")
            .env_remove("STEVEDORE_AUTH_SECRET");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute stevedore");
        Self::output_to_result(output)
    }

    fn output_to_result(output: Output) -> TestResult {
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Write a file to the project directory
    pub fn write_project_file(&self, relative_path: &str, content: &str) {
        let full_path = self.project_path(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
    }

    /// Remove an artifact from the project
    pub fn remove_artifact(&self, name: &str) {
        let path = self.project_path(name);
        if path.exists() {
            std::fs::remove_file(&path).expect("Failed to remove artifact");
        }
    }
}

/// Builder for TestEnv with fluent API
pub struct TestEnvBuilder {
    config: Option<String>,
    artifacts: Vec<(String, String)>,
}

impl TestEnvBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            artifacts: Vec::new(),
        }
    }

    /// Set stevedore.toml content
    pub fn with_config(mut self, toml: &str) -> Self {
        self.config = Some(toml.to_string());
        self
    }

    /// Add an artifact file to the project
    pub fn with_artifact(mut self, name: &str, content: &str) -> Self {
        self.artifacts.push((name.to_string(), content.to_string()));
        self
    }

    /// Build the TestEnv
    pub fn build(self) -> TestEnv {
        let project_root = TempDir::new().expect("Failed to create project temp dir");
        let home_dir = TempDir::new().expect("Failed to create home temp dir");

        if let Some(config) = &self.config {
            std::fs::write(project_root.path().join("stevedore.toml"), config)
                .expect("Failed to write stevedore.toml");
        }

        for (name, content) in &self.artifacts {
            let path = project_root.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create artifact directory");
            }
            std::fs::write(&path, content).expect("Failed to write artifact");
        }

        TestEnv {
            project_root,
            home_dir,
        }
    }
}

impl Default for TestEnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_writes_config_and_artifacts() {
        let env = TestEnv::builder()
            .with_config("[target]\nhost = \"h\"\nuser = \"u\"\n")
            .with_artifact("deploy.tar.gz", "data")
            .build();

        assert!(env.project_path("stevedore.toml").exists());
        assert!(env.project_path("deploy.tar.gz").exists());
    }
}
