use std::fs;

use fwstage_lib::Target;
use fwstage_lib::stage::{FsBuild, StageOptions, stage_artifacts};
use fwstage_lib::upload::{UploadError, UploadSequence, UploadState, upload_firmware};
use fwstage_lib::version::{Version, stamp_version};
use tempfile::TempDir;

use super::common::{ScriptedTool, context, write};

#[test]
fn post_build_then_version_fills_staging_dir() {
  let temp = TempDir::new().unwrap();
  let ctx = context(temp.path());
  write(&ctx.firmware_path(), b"firmware image");
  let mut tool = ScriptedTool::new();
  tool.buildfs_writes = Some((ctx.build_dir.join("littlefs.bin"), b"fs image".to_vec()));

  let stamp = stamp_version(&ctx, Version::now()).unwrap();
  let report = stage_artifacts(&ctx, &tool, &StageOptions::default()).unwrap();

  let mut names: Vec<_> = fs::read_dir(ctx.staging_dir())
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
    .collect();
  names.sort();
  assert_eq!(names, vec!["firmware.bin", "littlefs.bin", "version.txt"]);

  assert_eq!(report.fs_build, FsBuild::Succeeded);
  assert_eq!(*tool.calls.borrow(), vec![Target::BuildFs]);
  assert_eq!(
    fs::read_to_string(ctx.staging_dir().join("version.txt")).unwrap(),
    format!("{}\n", stamp.version)
  );
}

#[test]
fn failed_build_without_image_copies_nothing_extra() {
  let temp = TempDir::new().unwrap();
  let ctx = context(temp.path());
  write(&ctx.firmware_path(), b"fw");
  let mut tool = ScriptedTool::new();
  tool.buildfs_code = 1;

  let report = stage_artifacts(&ctx, &tool, &StageOptions::default()).unwrap();

  assert!(report.fs_image.is_none());
  assert_eq!(fs::read_dir(&report.staging_dir).unwrap().count(), 1);
}

#[test]
fn separate_environments_stage_separately() {
  let temp = TempDir::new().unwrap();
  let esp32 = context(temp.path());
  let mut eth = esp32.clone();
  eth.env_name = "esp32-eth".to_string();
  write(&esp32.firmware_path(), b"wifi build");
  let tool = ScriptedTool::new();

  stage_artifacts(&esp32, &tool, &StageOptions { skip_fs_image: true }).unwrap();
  stage_artifacts(&eth, &tool, &StageOptions { skip_fs_image: true }).unwrap();

  assert!(temp.path().join("builds/esp32/firmware.bin").is_file());
  assert!(temp.path().join("builds/esp32-eth/firmware.bin").is_file());
}

#[test]
fn upload_aborts_before_firmware_on_fs_failure() {
  let temp = TempDir::new().unwrap();
  let ctx = context(temp.path());
  let mut tool = ScriptedTool::new();
  tool.uploadfs_code = 1;

  let result = UploadSequence::new(&ctx, &tool).run(|ctx| upload_firmware(ctx, &tool));

  assert!(matches!(result, Err(UploadError::FsUploadFailed { .. })));
  assert_eq!(*tool.calls.borrow(), vec![Target::UploadFs]);
}

#[test]
fn upload_sequence_success() {
  let temp = TempDir::new().unwrap();
  let ctx = context(temp.path());
  let tool = ScriptedTool::new();

  let state = UploadSequence::new(&ctx, &tool)
    .run(|ctx| upload_firmware(ctx, &tool))
    .unwrap();

  assert_eq!(state, UploadState::FsUploaded);
  assert_eq!(*tool.calls.borrow(), vec![Target::UploadFs, Target::Upload]);
}
