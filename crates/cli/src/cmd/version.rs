//! Implementation of the `fwstage version` command.
//!
//! Stamps a fresh version: writes `builds/<env>/version.txt` and prints the
//! matching `VERSION` define on stdout, so the command can be used directly
//! as a PlatformIO dynamic build flag (`build_flags = !fwstage version`).

use anyhow::{Context, Result};

use fwstage_lib::BuildContext;
use fwstage_lib::version::{Version, stamp_version};

use crate::output::{OutputFormat, Status, print_json, report_stderr};

pub fn cmd_version(ctx: &BuildContext, format: OutputFormat) -> Result<()> {
  let stamp = stamp_version(ctx, Version::now()).context("Failed to stamp version")?;

  if format.is_json() {
    return print_json(&stamp);
  }

  report_stderr(
    Status::Note,
    &format!(
      "Created {} with version {}",
      stamp.file.display(),
      stamp.version
    ),
  );
  println!("{}", stamp.define);

  Ok(())
}
