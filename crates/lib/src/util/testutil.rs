//! Test utilities for fwstage-lib.
//!
//! Provides a scripted [`ToolRunner`] so hook logic can be tested without
//! PlatformIO installed.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::BuildContext;
use crate::tool::{Target, TargetStatus, ToolError, ToolRunner};

/// Context rooted at `project_dir` with PlatformIO's default layout.
pub fn test_context(project_dir: &Path) -> BuildContext {
  BuildContext {
    env_name: "esp32".to_string(),
    project_dir: project_dir.to_path_buf(),
    build_dir: project_dir.join(".pio").join("build").join("esp32"),
    prog_name: "firmware".to_string(),
    tool: PathBuf::from("pio"),
  }
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &[u8]) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, content).unwrap();
}

/// Records invocations and answers with scripted exit codes.
///
/// Targets succeed unless configured otherwise.
#[derive(Default)]
pub struct FakeRunner {
  calls: RefCell<Vec<Target>>,
  codes: Vec<(Target, Option<i32>)>,
  spawn_fails: bool,
  creates: Vec<(Target, PathBuf, Vec<u8>)>,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Exit with `code` when `target` runs.
  pub fn with_code(mut self, target: Target, code: Option<i32>) -> Self {
    self.codes.push((target, code));
    self
  }

  /// Fail every invocation as if the tool were not installed.
  pub fn not_installed(mut self) -> Self {
    self.spawn_fails = true;
    self
  }

  /// Write `content` to `path` when `target` runs, before reporting its status.
  pub fn creating(mut self, target: Target, path: impl Into<PathBuf>, content: &[u8]) -> Self {
    self.creates.push((target, path.into(), content.to_vec()));
    self
  }

  pub fn calls(&self) -> Vec<Target> {
    self.calls.borrow().clone()
  }
}

impl ToolRunner for FakeRunner {
  fn run_target(&self, ctx: &BuildContext, target: Target) -> Result<TargetStatus, ToolError> {
    self.calls.borrow_mut().push(target);

    if self.spawn_fails {
      return Err(ToolError::Spawn {
        program: ctx.tool.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
      });
    }

    for (_, path, content) in self.creates.iter().filter(|(t, _, _)| *t == target) {
      write_file(path, content);
    }

    let code = self
      .codes
      .iter()
      .find(|(t, _)| *t == target)
      .map(|(_, code)| *code)
      .unwrap_or(Some(0));
    Ok(TargetStatus { code })
  }
}
