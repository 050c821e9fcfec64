//! Implementation of the `fwstage upload` command.
//!
//! Uploads the filesystem image and, unless `--fs-only` is given, the
//! firmware afterwards. With `--fs-only` the command acts as a pre-upload
//! hook: a non-zero exit tells the calling pipeline not to upload firmware.

use std::time::Instant;

use anyhow::{Context, Result};

use fwstage_lib::BuildContext;
use fwstage_lib::tool::PioTool;
use fwstage_lib::upload::{UploadError, UploadSequence, upload_firmware};

use crate::output::{Status, elapsed, print_banner, report};

pub fn cmd_upload(ctx: &BuildContext, fs_only: bool) -> Result<()> {
  let runner = PioTool::new();
  let mut sequence = UploadSequence::new(ctx, &runner);
  let start = Instant::now();

  print_banner("Uploading LittleFS filesystem first...");

  let result = if fs_only {
    sequence.upload_filesystem().map(|()| {
      print_banner("LittleFS uploaded successfully.");
      println!();
    })
  } else {
    sequence
      .run(|ctx| {
        print_banner("LittleFS uploaded successfully. Now uploading firmware...");
        println!();
        upload_firmware(ctx, &runner)
      })
      .map(|_| ())
  };

  match result {
    Ok(()) => {
      report(Status::Done, &format!("Upload finished in {}", elapsed(start.elapsed())));
      Ok(())
    }
    Err(e @ (UploadError::FsUploadFailed { .. } | UploadError::Tool(_))) => {
      report(Status::Failure, "LittleFS upload failed! Firmware will not be uploaded.");
      Err(e).context("Upload aborted")
    }
    Err(e) => Err(e).context("Upload failed"),
  }
}
