//! Locating the filesystem image, building it on demand.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::consts::{BIN_EXTENSION, FS_IMAGE_MARKER, FS_IMAGE_NAME};
use crate::context::BuildContext;
use crate::tool::{Target, ToolRunner, describe};

/// What happened to the `buildfs` step while locating the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FsBuild {
  /// Filesystem staging was not requested.
  Skipped,
  /// `littlefs.bin` already existed; the tool was not invoked.
  NotNeeded,
  Succeeded,
  /// The tool ran and exited non-zero.
  Failed { code: Option<i32> },
  /// The tool could not be started.
  SpawnFailed { message: String },
}

/// Result of [`ensure_fs_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsImageLookup {
  pub image: Option<PathBuf>,
  pub build: FsBuild,
}

/// Find the filesystem image in `build_dir`, running `buildfs` if the
/// canonical `littlefs.bin` is missing.
///
/// A failing build is logged and the search continues; not finding any image
/// is reported as `image: None`, never as an error.
pub fn ensure_fs_image(ctx: &BuildContext, runner: &impl ToolRunner) -> FsImageLookup {
  let build_dir = &ctx.build_dir;

  if let Some(image) = exact_fs_image(build_dir) {
    debug!(path = %image.display(), "filesystem image already built");
    return FsImageLookup {
      image: Some(image),
      build: FsBuild::NotNeeded,
    };
  }

  info!(env = %ctx.env_name, "{} not found, building filesystem image", FS_IMAGE_NAME);
  let build = match runner.run_target(ctx, Target::BuildFs) {
    Ok(status) if status.success() => FsBuild::Succeeded,
    Ok(status) => {
      warn!(
        cmd = %describe(&ctx.tool, &ctx.env_name, Target::BuildFs),
        code = ?status.code,
        "filesystem image build failed, looking for an existing image"
      );
      FsBuild::Failed { code: status.code }
    }
    Err(err) => {
      warn!(error = %err, "filesystem image build could not run, looking for an existing image");
      FsBuild::SpawnFailed {
        message: err.to_string(),
      }
    }
  };

  let image = find_fs_image(build_dir);
  if image.is_none() {
    info!(dir = %build_dir.display(), "no filesystem image found");
  }
  FsImageLookup { image, build }
}

/// Exact `littlefs.bin`, falling back to the first littlefs-named `.bin`.
pub fn find_fs_image(build_dir: &Path) -> Option<PathBuf> {
  exact_fs_image(build_dir).or_else(|| {
    let candidates = fallback_candidates(build_dir);
    if candidates.len() > 1 {
      debug!(count = candidates.len(), "several filesystem image candidates, using the first by name");
    }
    candidates.into_iter().next()
  })
}

fn exact_fs_image(build_dir: &Path) -> Option<PathBuf> {
  let path = build_dir.join(FS_IMAGE_NAME);
  path.is_file().then_some(path)
}

/// Files directly in `build_dir` whose name contains `littlefs` and ends in
/// `.bin`, sorted by file name.
pub fn fallback_candidates(build_dir: &Path) -> Vec<PathBuf> {
  if !build_dir.is_dir() {
    return Vec::new();
  }

  let suffix = format!(".{BIN_EXTENSION}");
  let mut candidates = Vec::new();

  for entry in WalkDir::new(build_dir).min_depth(1).max_depth(1).sort_by_file_name() {
    let entry = match entry {
      Ok(entry) => entry,
      Err(err) => {
        warn!(error = %err, "skipping unreadable entry in build directory");
        continue;
      }
    };
    // Follows symlinks, like the exact-name lookup.
    if !entry.path().is_file() {
      continue;
    }
    let name = entry.file_name().to_string_lossy();
    if matches!(name, Cow::Owned(_)) {
      debug!(path = %entry.path().display(), "build directory entry has a non-UTF-8 name");
    }
    if name.contains(FS_IMAGE_MARKER) && name.ends_with(&suffix) {
      candidates.push(entry.into_path());
    }
  }

  candidates
}
