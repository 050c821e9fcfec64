//! Build context passed explicitly into every hook.
//!
//! PlatformIO exports the active environment, project directory, build
//! directory and program name to hook processes. [`BuildContext::resolve`]
//! merges those variables with explicit overrides (CLI flags) and defaults.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  BIN_EXTENSION, DEFAULT_PROG_NAME, DEFAULT_TOOL, ENV_BUILD_DIR, ENV_PIOENV, ENV_PROGNAME, ENV_PROJECT_DIR,
  ENV_TOOL, STAGING_DIR_NAME,
};

#[derive(Debug, Error)]
pub enum ContextError {
  #[error("no build environment given (pass --environment or set PIOENV)")]
  MissingEnvironment,

  #[error("invalid build environment name: {0:?}")]
  InvalidEnvironment(String),

  #[error("failed to determine current directory: {0}")]
  CurrentDir(#[source] std::io::Error),
}

/// Explicit values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
  pub env_name: Option<String>,
  pub project_dir: Option<PathBuf>,
  pub build_dir: Option<PathBuf>,
  pub prog_name: Option<String>,
  pub tool: Option<PathBuf>,
}

/// Read-only view of the build variables for one hook invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildContext {
  /// PlatformIO environment name, e.g. `esp32`.
  pub env_name: String,
  pub project_dir: PathBuf,
  /// Directory the build tool writes `firmware.bin` and `littlefs.bin` into.
  pub build_dir: PathBuf,
  pub prog_name: String,
  /// Build tool executable invoked for `buildfs`/`uploadfs`/`upload`.
  pub tool: PathBuf,
}

impl BuildContext {
  /// Resolve a context from overrides, then environment variables, then defaults.
  pub fn resolve(overrides: ContextOverrides) -> Result<Self, ContextError> {
    let env_name = overrides
      .env_name
      .or_else(|| non_empty_var(ENV_PIOENV))
      .ok_or(ContextError::MissingEnvironment)?;
    validate_env_name(&env_name)?;

    let project_dir = match overrides.project_dir.or_else(|| non_empty_var(ENV_PROJECT_DIR).map(PathBuf::from)) {
      Some(dir) => dir,
      None => std::env::current_dir().map_err(ContextError::CurrentDir)?,
    };
    let project_dir = dunce::canonicalize(&project_dir).unwrap_or(project_dir);

    let build_dir = overrides
      .build_dir
      .or_else(|| non_empty_var(ENV_BUILD_DIR).map(PathBuf::from))
      .unwrap_or_else(|| default_build_dir(&project_dir, &env_name));

    let prog_name = overrides
      .prog_name
      .or_else(|| non_empty_var(ENV_PROGNAME))
      .unwrap_or_else(|| DEFAULT_PROG_NAME.to_string());

    let tool = overrides
      .tool
      .or_else(|| non_empty_var(ENV_TOOL).map(PathBuf::from))
      .unwrap_or_else(|| PathBuf::from(DEFAULT_TOOL));

    let ctx = Self {
      env_name,
      project_dir,
      build_dir,
      prog_name,
      tool,
    };
    debug!(?ctx, "resolved build context");
    Ok(ctx)
  }

  /// `<project_dir>/builds/<env_name>`
  pub fn staging_dir(&self) -> PathBuf {
    self.project_dir.join(STAGING_DIR_NAME).join(&self.env_name)
  }

  /// `<build_dir>/<prog_name>.bin`
  pub fn firmware_path(&self) -> PathBuf {
    self
      .build_dir
      .join(format!("{}.{}", self.prog_name, BIN_EXTENSION))
  }
}

/// PlatformIO's default build directory: `<project>/.pio/build/<env>`.
fn default_build_dir(project_dir: &Path, env_name: &str) -> PathBuf {
  project_dir.join(".pio").join("build").join(env_name)
}

fn non_empty_var(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// The environment name becomes a single directory component under `builds/`.
fn validate_env_name(name: &str) -> Result<(), ContextError> {
  let invalid = name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']);
  if invalid {
    return Err(ContextError::InvalidEnvironment(name.to_string()));
  }
  Ok(())
}
