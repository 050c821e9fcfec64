//! Invocation of the external build tool.
//!
//! Every hook that needs PlatformIO goes through [`ToolRunner`], which runs
//! `<tool> run -e <env> -t <target>` from the project root and reports only
//! the exit status. Output is inherited so the user sees the tool's progress.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::context::BuildContext;

/// Build tool targets used by the hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
  /// Produce the filesystem image (`littlefs.bin`).
  BuildFs,
  /// Flash the filesystem image.
  UploadFs,
  /// Flash the firmware.
  Upload,
}

impl Target {
  pub fn as_str(self) -> &'static str {
    match self {
      Target::BuildFs => "buildfs",
      Target::UploadFs => "uploadfs",
      Target::Upload => "upload",
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Exit status of a finished tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetStatus {
  /// Exit code, `None` if the process was killed by a signal.
  pub code: Option<i32>,
}

impl TargetStatus {
  pub fn success(self) -> bool {
    self.code == Some(0)
  }
}

#[derive(Debug, Error)]
pub enum ToolError {
  /// The tool could not be started at all.
  #[error("failed to run {}: {source}", program.display())]
  Spawn { program: PathBuf, source: std::io::Error },
}

/// Runs build tool targets for an environment.
pub trait ToolRunner {
  /// Run `target` for `ctx.env_name`, blocking until the tool exits.
  fn run_target(&self, ctx: &BuildContext, target: Target) -> Result<TargetStatus, ToolError>;
}

/// Runs the real build tool as a subprocess.
#[derive(Debug, Clone, Default)]
pub struct PioTool;

impl PioTool {
  pub fn new() -> Self {
    Self
  }
}

impl ToolRunner for PioTool {
  fn run_target(&self, ctx: &BuildContext, target: Target) -> Result<TargetStatus, ToolError> {
    let args = target_args(&ctx.env_name, target);
    info!(tool = %ctx.tool.display(), args = %args.join(" "), "running build tool");

    let mut command = Command::new(&ctx.tool);
    command
      .args(&args)
      .stdin(Stdio::null())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit());
    // The project root may not exist yet for ad hoc invocations; let the tool decide.
    if ctx.project_dir.is_dir() {
      command.current_dir(&ctx.project_dir);
    }

    debug!(cwd = %ctx.project_dir.display(), "spawning process");

    let status = command.status().map_err(|source| ToolError::Spawn {
      program: ctx.tool.clone(),
      source,
    })?;

    let status = TargetStatus { code: status.code() };
    debug!(tool_target = %target, code = ?status.code, "build tool finished");
    Ok(status)
  }
}

/// Arguments for `<tool> run -e <env> -t <target>`.
pub fn target_args(env_name: &str, target: Target) -> Vec<String> {
  vec![
    "run".to_string(),
    "-e".to_string(),
    env_name.to_string(),
    "-t".to_string(),
    target.as_str().to_string(),
  ]
}

/// Render an invocation for log and error messages.
pub fn describe(tool: &Path, env_name: &str, target: Target) -> String {
  format!("{} {}", tool.display(), target_args(env_name, target).join(" "))
}
