//! Shared test helpers for CLI integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub const ENV_NAME: &str = "esp32";

/// Variables PlatformIO exports to hooks; cleared so the host environment
/// cannot leak into a test.
const CONTEXT_VARS: [&str; 5] = ["PIOENV", "PROJECT_DIR", "BUILD_DIR", "PROGNAME", "FWSTAGE_TOOL"];

/// Isolated PlatformIO-like project.
///
/// Layout: `<temp>/project` with binaries under `.pio/build/esp32`, and a
/// fake build tool at `<temp>/fake-pio` that appends its arguments to
/// `<temp>/tool.log`.
pub struct TestProject {
  pub temp: TempDir,
}

impl TestProject {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("project")).unwrap();
    let project = Self { temp };
    project.fake_tool("exit 0");
    project
  }

  pub fn project_dir(&self) -> PathBuf {
    let p = self.temp.path().join("project");
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn build_dir(&self) -> PathBuf {
    self.project_dir().join(".pio").join("build").join(ENV_NAME)
  }

  pub fn staging_dir(&self) -> PathBuf {
    self.project_dir().join("builds").join(ENV_NAME)
  }

  pub fn tool_path(&self) -> PathBuf {
    self.temp.path().join("fake-pio")
  }

  /// Write a file under the build directory.
  pub fn write_build_file(&self, name: &str, content: &[u8]) {
    write(&self.build_dir().join(name), content);
  }

  pub fn write_firmware(&self, content: &[u8]) {
    self.write_build_file("firmware.bin", content);
  }

  /// Replace the fake build tool. `body` runs after the invocation is logged;
  /// the target is available as `$5` (`run -e <env> -t <target>`).
  pub fn fake_tool(&self, body: &str) {
    let script = format!(
      "#!/bin/sh\necho \"$*\" >> \"{}\"\n{}\n",
      self.temp.path().join("tool.log").display(),
      body
    );
    let path = self.tool_path();
    fs::write(&path, script).unwrap();
    make_executable(&path);
  }

  /// Fake tool exiting with `code` for `target` and zero otherwise.
  pub fn fake_tool_failing(&self, target: &str, code: i32) {
    self.fake_tool(&format!(
      "if [ \"$5\" = \"{}\" ]; then exit {}; fi\nexit 0",
      target, code
    ));
  }

  /// Fake tool whose `buildfs` target produces `littlefs.bin`.
  pub fn fake_tool_building_fs(&self, content: &str) {
    self.fake_tool(&format!(
      "if [ \"$5\" = \"buildfs\" ]; then printf '%s' '{}' > \"{}\"; fi\nexit 0",
      content,
      self.build_dir().join("littlefs.bin").display()
    ));
  }

  /// Logged tool invocations, one per line.
  pub fn tool_calls(&self) -> Vec<String> {
    fs::read_to_string(self.temp.path().join("tool.log"))
      .map(|log| log.lines().map(str::to_string).collect())
      .unwrap_or_default()
  }

  /// Command for the fwstage binary with no environment selected.
  pub fn bare_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("fwstage");
    for var in CONTEXT_VARS {
      cmd.env_remove(var);
    }
    cmd.current_dir(self.project_dir());
    cmd.env("NO_COLOR", "1");
    cmd
  }

  /// Command for the fwstage binary targeting this project's `esp32` environment.
  pub fn fwstage_cmd(&self) -> Command {
    let mut cmd = self.bare_cmd();
    cmd.arg("--environment").arg(ENV_NAME).arg("--tool").arg(self.tool_path());
    cmd
  }
}

fn write(path: &Path, content: &[u8]) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, content).unwrap();
}

#[cfg(unix)]
fn make_executable(path: &Path) {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}
