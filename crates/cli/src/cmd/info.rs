use anyhow::Result;

use fwstage_lib::BuildContext;
use fwstage_lib::consts::FS_IMAGE_NAME;

use crate::output::{OutputFormat, print_json, print_field};

pub fn cmd_info(ctx: &BuildContext, format: OutputFormat) -> Result<()> {
  if format.is_json() {
    return print_json(&serde_json::json!({
      "context": ctx,
      "firmware": ctx.firmware_path(),
      "staging_dir": ctx.staging_dir(),
    }));
  }

  println!("Build context:");
  print_field("Environment", &ctx.env_name);
  print_field("Project", &ctx.project_dir.display().to_string());
  print_field("Build dir", &ctx.build_dir.display().to_string());
  print_field("Firmware", &ctx.firmware_path().display().to_string());
  print_field("FS image", &ctx.build_dir.join(FS_IMAGE_NAME).display().to_string());
  print_field("Staging", &ctx.staging_dir().display().to_string());
  print_field("Tool", &ctx.tool.display().to_string());

  Ok(())
}
