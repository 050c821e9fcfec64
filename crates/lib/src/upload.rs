//! Uploading the filesystem image before the firmware.
//!
//! The firmware reads its web assets and settings from the LittleFS
//! partition, so a firmware upload must never run after a failed filesystem
//! upload. [`UploadSequence`] tracks that ordering:
//!
//! ```text
//! Pending --uploadfs ok--> FsUploaded --> firmware upload
//!    \
//!     `---uploadfs failed--> Aborted
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::context::BuildContext;
use crate::tool::{Target, ToolError, ToolRunner, describe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
  Pending,
  FsUploaded,
  Aborted,
}

#[derive(Debug, Error)]
pub enum UploadError {
  /// `uploadfs` exited non-zero; the firmware upload was not attempted.
  #[error("filesystem upload failed with exit code {code:?}: {cmd}")]
  FsUploadFailed { cmd: String, code: Option<i32> },

  #[error("filesystem upload could not run: {0}")]
  Tool(#[from] ToolError),

  #[error("firmware upload failed with exit code {code:?}: {cmd}")]
  FirmwareUploadFailed { cmd: String, code: Option<i32> },

  #[error("filesystem upload already attempted (state: {0:?})")]
  AlreadyAttempted(UploadState),
}

/// One pre-upload sequence for an environment. No retries: once the
/// filesystem step has run, the sequence is spent.
pub struct UploadSequence<'a, R: ToolRunner> {
  ctx: &'a BuildContext,
  runner: &'a R,
  state: UploadState,
}

impl<'a, R: ToolRunner> UploadSequence<'a, R> {
  pub fn new(ctx: &'a BuildContext, runner: &'a R) -> Self {
    Self {
      ctx,
      runner,
      state: UploadState::Pending,
    }
  }

  pub fn state(&self) -> UploadState {
    self.state
  }

  /// Run `uploadfs`, blocking. Moves to `FsUploaded` on success and to
  /// `Aborted` on any failure.
  pub fn upload_filesystem(&mut self) -> Result<(), UploadError> {
    if self.state != UploadState::Pending {
      return Err(UploadError::AlreadyAttempted(self.state));
    }

    info!(env = %self.ctx.env_name, "uploading filesystem image before firmware");

    let status = match self.runner.run_target(self.ctx, Target::UploadFs) {
      Ok(status) => status,
      Err(err) => {
        self.state = UploadState::Aborted;
        error!(error = %err, "filesystem upload could not run");
        return Err(err.into());
      }
    };

    if !status.success() {
      self.state = UploadState::Aborted;
      let cmd = describe(&self.ctx.tool, &self.ctx.env_name, Target::UploadFs);
      error!(cmd = %cmd, code = ?status.code, "filesystem upload failed, firmware upload aborted");
      return Err(UploadError::FsUploadFailed { cmd, code: status.code });
    }

    self.state = UploadState::FsUploaded;
    info!("filesystem image uploaded");
    Ok(())
  }

  /// Upload the filesystem, then hand over to `upload_firmware`.
  ///
  /// `upload_firmware` runs only if the filesystem upload succeeded.
  pub fn run<F>(mut self, upload_firmware: F) -> Result<UploadState, UploadError>
  where
    F: FnOnce(&BuildContext) -> Result<(), UploadError>,
  {
    self.upload_filesystem()?;
    upload_firmware(self.ctx)?;
    Ok(self.state)
  }
}

/// Firmware upload through the build tool's `upload` target.
pub fn upload_firmware(ctx: &BuildContext, runner: &impl ToolRunner) -> Result<(), UploadError> {
  let status = runner.run_target(ctx, Target::Upload)?;
  if !status.success() {
    return Err(UploadError::FirmwareUploadFailed {
      cmd: describe(&ctx.tool, &ctx.env_name, Target::Upload),
      code: status.code,
    });
  }
  info!(env = %ctx.env_name, "firmware uploaded");
  Ok(())
}
