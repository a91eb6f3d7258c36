//! Stevedore CLI - single-host deployment sequencer
//!
//! Usage: stevedore <COMMAND>
//!
//! Commands:
//!   check   Verify local artifacts exist and report their size
//!   plan    Print the ordered scp/ssh commands for manual execution
//!   deploy  Execute the deployment plan step by step

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;

use stevedore::artifact::validate_artifacts;
use stevedore::config::{Config, AUTH_SECRET_ENV};
use stevedore::error::DeployError;
use stevedore::plan::{build_plan, describe_plan, DeployPlan, PlanOptions};
use stevedore::runner::{execute_plan, ExecuteOptions, ShellRunner};
use stevedore::target::{AuthSecret, DeployTarget};

/// Stevedore - single-host deployment sequencer
#[derive(Parser, Debug)]
#[command(name = "stevedore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output machine-readable JSON events
    #[arg(long, default_value = "false")]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file (default: ./stevedore.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify local artifacts exist and report their size
    Check,

    /// Print the ordered deployment commands without executing anything
    Plan {
        /// Override the configured target (user@host)
        #[arg(long)]
        remote: Option<String>,
    },

    /// Execute the deployment plan via scp/ssh
    Deploy {
        /// Override the configured target (user@host)
        #[arg(long)]
        remote: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Show the plan and exit without running anything
        #[arg(long)]
        dry_run: bool,

        /// Per-step timeout in seconds (default: no timeout)
        #[arg(long)]
        timeout: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::discover(cli.config.as_deref())?;
    config.apply_env_overrides();
    config.validate()?;

    match cli.command {
        Commands::Check => cmd_check(&config, cli.json, cli.verbose),
        Commands::Plan { remote } => {
            cmd_plan(&config, remote.as_deref(), cli.json, cli.verbose)
        }
        Commands::Deploy {
            remote,
            yes,
            dry_run,
            timeout,
        } => cmd_deploy(
            &config,
            remote.as_deref(),
            yes,
            dry_run,
            timeout.map(Duration::from_secs),
            cli.json,
        ),
    }
}

/// Resolve the deploy target: --remote override, else configuration
fn resolve_target(config: &Config, remote: Option<&str>) -> Result<DeployTarget> {
    let target = match remote {
        Some(spec) => {
            let target = DeployTarget::parse(spec)?;
            match std::env::var(AUTH_SECRET_ENV) {
                Ok(secret) if !secret.is_empty() => target.with_secret(AuthSecret::new(secret)),
                _ => target,
            }
        }
        None => config.target(),
    };
    Ok(target)
}

fn plan_for(config: &Config, remote: Option<&str>) -> Result<(DeployTarget, DeployPlan)> {
    let target = resolve_target(config, remote)?;
    let metas = validate_artifacts(&config.artifact_specs())?;
    let options = PlanOptions {
        insecure_host_key: config.transfer.insecure_host_key,
    };
    let plan = build_plan(&target, &metas, &options);
    Ok((target, plan))
}

fn cmd_check(config: &Config, json: bool, verbose: u8) -> Result<()> {
    if !json {
        println!("🔍 Stevedore Check");
    }

    let metas = validate_artifacts(&config.artifact_specs())?;

    if json {
        let artifacts: Vec<_> = metas
            .iter()
            .map(|m| {
                serde_json::json!({
                    "path": m.spec.local_path.display().to_string(),
                    "size_bytes": m.size_bytes,
                    "sha256": m.sha256,
                })
            })
            .collect();
        let output = serde_json::json!({
            "event": "check",
            "status": "ok",
            "artifacts": artifacts,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        for meta in &metas {
            println!(
                "  ✓ {} ({})",
                meta.spec.local_path.display(),
                meta.size_display()
            );
            if verbose > 0 {
                println!("    sha256: {}", meta.sha256);
            }
        }
        println!("\n✓ {} artifacts ready", metas.len());
    }

    Ok(())
}

fn cmd_plan(config: &Config, remote: Option<&str>, json: bool, verbose: u8) -> Result<()> {
    let (target, plan) = plan_for(config, remote)?;
    let lines = describe_plan(&plan);

    if json {
        let output = serde_json::json!({
            "event": "plan",
            "target": target.login(),
            "steps": lines,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("🚀 Stevedore Plan");
    println!("📡 Target: {}", target.login());
    if verbose > 0 {
        if let Some(secret) = target.secret() {
            println!("🔐 Auth secret: {}", secret);
        }
    }
    println!();
    println!("📋 Commands to run:");
    for (i, line) in lines.iter().enumerate() {
        println!("{}. {}", i + 1, line);
    }
    println!();
    println!(
        "🔑 Use key-based authentication (ssh-copy-id {}); stevedore never prints passwords.",
        target.login()
    );

    Ok(())
}

fn cmd_deploy(
    config: &Config,
    remote: Option<&str>,
    yes: bool,
    dry_run: bool,
    timeout: Option<Duration>,
    json: bool,
) -> Result<()> {
    let (target, plan) = plan_for(config, remote)?;
    let total = plan.len();

    if !json {
        println!("🚀 Stevedore Deploy");
        println!("📡 Target: {}", target.login());
        println!("📦 {} steps planned", total);
        if dry_run {
            println!("Mode: Dry run");
        }
        println!();
    }

    if dry_run {
        if json {
            let output = serde_json::json!({
                "event": "deploy",
                "status": "dry-run",
                "target": target.login(),
                "steps": describe_plan(&plan),
            });
            println!("{}", serde_json::to_string(&output)?);
        } else {
            for (i, line) in describe_plan(&plan).iter().enumerate() {
                println!("{}. {}", i + 1, line);
            }
            println!("\nDry run - nothing executed");
        }
        return Ok(());
    }

    if !yes {
        if !std::io::stdin().is_terminal() {
            anyhow::bail!("refusing to deploy without --yes when stdin is not a terminal");
        }
        if !confirm(&target.login())? {
            return Err(DeployError::Aborted.into());
        }
    }

    // Ctrl+C cancels between steps, never mid-transfer
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();
    ctrlc::set_handler(move || {
        cancel_clone.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let options = ExecuteOptions {
        timeout,
        cancel: Some(cancel),
    };

    let result = execute_plan(&plan, &ShellRunner, &options, |index, step| {
        if json {
            let event = serde_json::json!({
                "event": "step",
                "index": index,
                "total": total,
                "command": plan.render_step(step),
            });
            println!("{}", serde_json::to_string(&event).unwrap_or_default());
        } else {
            println!("⚙️  [{}/{}] {}", index, total, plan.render_step(step));
        }
    });

    match result {
        Ok(report) => {
            if json {
                let output = serde_json::json!({
                    "event": "deploy",
                    "status": "success",
                    "completed": report.completed,
                    "total": report.total,
                });
                println!("{}", serde_json::to_string(&output)?);
            } else {
                println!(
                    "\n✅ Deployment complete ({}/{} steps)",
                    report.completed, report.total
                );
            }
            Ok(())
        }
        Err(DeployError::StepFailed {
            index,
            step,
            exit_code,
            stderr,
        }) => {
            if json {
                let output = serde_json::json!({
                    "event": "deploy",
                    "status": "failed",
                    "failed_step": index,
                    "completed": index - 1,
                    "total": total,
                    "exit_code": exit_code,
                    "stderr": stderr.clone(),
                });
                println!("{}", serde_json::to_string(&output)?);
            } else {
                eprintln!("{}", step_failure_line(index, exit_code));
                if !stderr.is_empty() {
                    eprintln!("  {}", stderr);
                }
                eprintln!("⚠ Completed through step {} of {}", index - 1, total);
            }
            Err(DeployError::StepFailed {
                index,
                step,
                exit_code,
                stderr,
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}

/// One-line failure report; a step without an exit code was killed
/// (signal or timeout)
fn step_failure_line(index: usize, exit_code: Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("✗ Step {} failed (exit code {})", index, code),
        None => format!("✗ Step {} failed (killed)", index),
    }
}

/// Plain y/N confirmation on stderr, matching the manual workflow
fn confirm(login: &str) -> Result<bool> {
    use std::io::Write;

    eprint!("Deploy to {}? [y/N] ", login);
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["stevedore", "check"]).unwrap();
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_cli_parse_plan_with_remote() {
        let cli =
            Cli::try_parse_from(["stevedore", "plan", "--remote", "deploy@host"]).unwrap();
        if let Commands::Plan { remote } = cli.command {
            assert_eq!(remote, Some("deploy@host".to_string()));
        } else {
            panic!("Expected Plan command");
        }
    }

    #[test]
    fn test_cli_parse_deploy_with_args() {
        let cli = Cli::try_parse_from([
            "stevedore",
            "deploy",
            "--yes",
            "--dry-run",
            "--timeout",
            "30",
        ])
        .unwrap();

        if let Commands::Deploy {
            yes,
            dry_run,
            timeout,
            ..
        } = cli.command
        {
            assert!(yes);
            assert!(dry_run);
            assert_eq!(timeout, Some(30));
        } else {
            panic!("Expected Deploy command");
        }
    }

    #[test]
    fn test_step_failure_line_formats_exit_code() {
        assert_eq!(step_failure_line(2, Some(1)), "✗ Step 2 failed (exit code 1)");
        assert_eq!(step_failure_line(3, None), "✗ Step 3 failed (killed)");
    }

    #[test]
    fn test_cli_json_flag() {
        let cli = Cli::try_parse_from(["stevedore", "--json", "check"]).unwrap();
        assert!(cli.json);
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["stevedore", "-vv", "check"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_config_flag() {
        let cli =
            Cli::try_parse_from(["stevedore", "--config", "custom.toml", "plan"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }
}
