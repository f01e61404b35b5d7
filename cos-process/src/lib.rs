//! cOS Process
//!
//! Runs external commands with buffered output and detects installed tools.

pub mod environment;

pub use environment::{Environment, RunOptions};

use cos_core::{path::unix_path, platform, CosError, CosResult};
use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, warn};

/// Buffered result of a finished (or unstartable) command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `None` when the process could not be spawned or was
    /// killed by a signal
    pub code: Option<i32>,
    pub spawn_error: Option<String>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

fn command(program: &str, args: &[&str], options: &RunOptions) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    if options.clear_env {
        cmd.env_clear();
    }
    cmd.envs(options.env.overrides());
    cmd
}

/// Runs `program` to completion and returns everything it printed.
///
/// This never fails: a spawn error is reported through
/// [`CommandOutput::spawn_error`] with no exit code.
pub async fn run_command(program: &str, args: &[&str], options: &RunOptions) -> CommandOutput {
    debug!("Running: {} {}", program, args.join(" "));
    match command(program, args, options).output().await {
        Ok(output) => {
            let result = CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                code: output.status.code(),
                spawn_error: None,
            };
            if options.log {
                debug!("{} stdout: {}", program, result.stdout);
                debug!("{} stderr: {}", program, result.stderr);
            }
            result
        }
        Err(e) => {
            warn!("Failed to run {}: {}", program, e);
            CommandOutput {
                spawn_error: Some(format!("Failed to run {}: {}", program, e)),
                ..Default::default()
            }
        }
    }
}

/// Check if an external tool is available
pub async fn check_tool(name: &str) -> bool {
    let finder = if platform::is_windows() { "where" } else { "which" };
    run_command(finder, &[name], &RunOptions::default()).await.success()
}

/// Directory that holds globally installed npm modules.
///
/// Fails when `npm get prefix` cannot run, exits non-zero or writes to stderr.
pub async fn global_modules_dir(options: &RunOptions) -> CosResult<String> {
    let npm = if platform::is_windows() { "npm.cmd" } else { "npm" };
    let output = run_command(npm, &["get", "prefix"], options).await;
    if let Some(err) = output.spawn_error {
        return Err(CosError::Other(err));
    }
    if !output.success() || !output.stderr.trim().is_empty() {
        return Err(CosError::Other(format!(
            "{} get prefix failed ({}): {}",
            npm,
            output.code.map_or_else(|| "no exit code".to_string(), |c| c.to_string()),
            output.stderr.trim()
        )));
    }
    Ok(modules_dir_from_prefix(output.stdout.trim(), platform::is_linux()))
}

fn modules_dir_from_prefix(prefix: &str, linux: bool) -> String {
    let mut dir = unix_path(prefix);
    if !dir.ends_with('/') {
        dir.push('/');
    }
    if linux {
        dir.push_str("lib/");
    }
    dir
}
