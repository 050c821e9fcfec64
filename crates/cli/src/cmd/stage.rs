//! Implementation of the `fwstage stage` command.
//!
//! Post-build hook: copies the firmware binary and, when available, the
//! filesystem image into `builds/<env>/`.

use anyhow::{Context, Result};
use tracing::info;

use fwstage_lib::BuildContext;
use fwstage_lib::stage::{FsBuild, StageOptions, stage_artifacts};
use fwstage_lib::tool::{PioTool, Target, describe};

use crate::output::{OutputFormat, Status, copied_line, print_json, report};

/// Execute the stage command.
///
/// Fails if the firmware binary cannot be staged. A missing filesystem image
/// is reported but does not fail the command.
pub fn cmd_stage(ctx: &BuildContext, skip_fs: bool, format: OutputFormat) -> Result<()> {
  let options = StageOptions { skip_fs_image: skip_fs };
  let staged = stage_artifacts(ctx, &PioTool::new(), &options)
    .with_context(|| format!("Failed to stage artifacts for environment '{}'", ctx.env_name))?;

  info!(path = %staged.staging_dir.display(), "staging complete");

  if format.is_json() {
    return print_json(&staged);
  }

  report(Status::Done, &copied_line(&staged.firmware));

  match &staged.fs_build {
    FsBuild::Failed { code } => report(
      Status::Warning,
      &format!(
        "'{}' failed (exit code {})",
        describe(&ctx.tool, &ctx.env_name, Target::BuildFs),
        code.map_or_else(|| "none".to_string(), |c| c.to_string())
      ),
    ),
    FsBuild::SpawnFailed { message } => report(
      Status::Warning,
      &format!("Could not build filesystem image: {message}"),
    ),
    FsBuild::Skipped | FsBuild::NotNeeded | FsBuild::Succeeded => {}
  }

  match &staged.fs_image {
    Some(image) => report(Status::Done, &copied_line(image)),
    None if staged.fs_build != FsBuild::Skipped => report(Status::Note, "No filesystem image found"),
    None => {}
  }

  println!();
  println!("Staged to {}", staged.staging_dir.display());

  Ok(())
}
