//! Command runner capability and plan execution.
//!
//! `CommandRunner` abstracts local process invocation so the sequencer can
//! be exercised without a network or an `ssh` binary. `ShellRunner` is the
//! real implementation; `MockRunner` is the scripted test double.
//!
//! Execution is strictly forward-only: steps run in order, the first
//! failure stops the plan, and nothing is rolled back.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::{DeployError, DeployResult};
use crate::plan::{DeployPlan, DeployStep};

/// Outcome of running one command
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code, None when the process was killed (signal or timeout)
    pub exit_code: Option<i32>,
    /// Captured stderr
    pub stderr: String,
    /// Whether the per-step timeout expired
    pub timed_out: bool,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }

    pub fn ok() -> Self {
        Self {
            exit_code: Some(0),
            stderr: String::new(),
            timed_out: false,
        }
    }

    pub fn failed(exit_code: i32, stderr: &str) -> Self {
        Self {
            exit_code: Some(exit_code),
            stderr: stderr.to_string(),
            timed_out: false,
        }
    }
}

/// Capability for invoking local commands (the operator's shell)
pub trait CommandRunner {
    /// Run a command, blocking until completion or the optional timeout.
    ///
    /// A nonzero exit is reported through `RunOutput`, not as an `Err`;
    /// `Err` means the command could not be spawned at all.
    fn run(&self, command: &str, timeout: Option<Duration>) -> std::io::Result<RunOutput>;
}

/// Runs commands through `sh -c`, streaming stdout to the terminal and
/// capturing stderr for failure reporting.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, timeout: Option<Duration>) -> std::io::Result<RunOutput> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain stderr on its own thread; a child that writes more than the
        // pipe buffer would otherwise block and never reach exit while we
        // poll try_wait.
        let mut stderr_pipe = child.stderr.take();
        let reader = std::thread::spawn(move || {
            let mut buf = String::new();
            if let Some(stderr) = stderr_pipe.as_mut() {
                let _ = stderr.read_to_string(&mut buf);
            }
            buf
        });

        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            if let Some(status) = child.try_wait()? {
                let stderr = reader.join().unwrap_or_default();
                return Ok(RunOutput {
                    exit_code: status.code(),
                    stderr,
                    timed_out: false,
                });
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    // Keep whatever the step managed to write before the kill
                    let stderr = reader.join().unwrap_or_default();
                    return Ok(RunOutput {
                        exit_code: None,
                        stderr,
                        timed_out: true,
                    });
                }
            }

            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

/// Execution options
#[derive(Default)]
pub struct ExecuteOptions {
    /// Per-step timeout; None blocks until the step finishes
    pub timeout: Option<Duration>,
    /// Cooperative cancellation flag, checked between steps (never mid-transfer)
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Result of a completed execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteReport {
    /// Steps that ran successfully
    pub completed: usize,
    pub total: usize,
}

/// Execute each plan step in order through the runner.
///
/// Stops at the first failing step with `StepFailed` (1-based index) and
/// does not attempt the remaining steps. `on_step` fires before each step
/// runs, for progress reporting.
pub fn execute_plan(
    plan: &DeployPlan,
    runner: &dyn CommandRunner,
    options: &ExecuteOptions,
    mut on_step: impl FnMut(usize, &DeployStep),
) -> DeployResult<ExecuteReport> {
    let total = plan.len();

    for (i, step) in plan.steps().iter().enumerate() {
        if let Some(cancel) = &options.cancel {
            if cancel.load(Ordering::SeqCst) {
                return Err(DeployError::Aborted);
            }
        }

        on_step(i + 1, step);

        let command = plan.render_step(step);
        let output = runner.run(&command, options.timeout)?;

        if !output.success() {
            let stderr = if output.timed_out {
                if output.stderr.trim().is_empty() {
                    "step timed out".to_string()
                } else {
                    format!("step timed out; {}", stderr_snippet(&output.stderr))
                }
            } else {
                stderr_snippet(&output.stderr)
            };
            return Err(DeployError::StepFailed {
                index: i + 1,
                step: command,
                exit_code: output.exit_code,
                stderr,
            });
        }
    }

    Ok(ExecuteReport {
        completed: total,
        total,
    })
}

/// First few lines of stderr, bounded for one-line error reporting
fn stderr_snippet(stderr: &str) -> String {
    const MAX_LEN: usize = 200;
    let trimmed = stderr.trim();
    let mut snippet: String = trimmed.chars().take(MAX_LEN).collect();
    if trimmed.chars().count() > MAX_LEN {
        snippet.push_str("...");
    }
    snippet
}

/// Scripted runner for tests: records every command and replays queued
/// outcomes (defaulting to success when the queue is empty).
pub struct MockRunner {
    pub calls: Mutex<Vec<String>>,
    outcomes: Mutex<Vec<RunOutput>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcomes: Mutex::new(Vec::new()),
        }
    }

    /// Queue the outcome for the next un-scripted call, in call order
    pub fn push_outcome(&self, output: RunOutput) {
        self.outcomes.lock().unwrap().push(output);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &str, _timeout: Option<Duration>) -> std::io::Result<RunOutput> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(command.to_string());

        let outcomes = self.outcomes.lock().unwrap();
        Ok(outcomes.get(index).cloned().unwrap_or_else(RunOutput::ok))
    }
}
