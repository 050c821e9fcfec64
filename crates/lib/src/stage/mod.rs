//! Staging build artifacts into `builds/<env>/`.
//!
//! After the firmware binary is produced, the post-build hook copies it, and
//! the filesystem image when one can be found or built, into the
//! per-environment staging directory. The staging directory is what the OTA
//! updater serves, so file names are preserved.

mod fs_image;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::context::BuildContext;
use crate::tool::ToolRunner;
use crate::util::hash::{ContentHash, HashError, hash_file};

pub use fs_image::{FsBuild, FsImageLookup, ensure_fs_image, fallback_candidates, find_fs_image};

/// Errors that can occur while staging artifacts.
#[derive(Debug, Error)]
pub enum StageError {
  #[error("build artifact not found: {}", path.display())]
  MissingArtifact { path: PathBuf },

  #[error("build artifact has no file name: {}", path.display())]
  NoFileName { path: PathBuf },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    source: std::io::Error,
  },

  #[error(transparent)]
  Hash(#[from] HashError),
}

/// A file copied into the staging directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedArtifact {
  pub source: PathBuf,
  pub destination: PathBuf,
  pub bytes: u64,
  /// SHA-256 of the staged copy.
  pub sha256: ContentHash,
}

/// Options for [`stage_artifacts`].
#[derive(Debug, Clone, Default)]
pub struct StageOptions {
  /// Copy only the firmware; never look for or build a filesystem image.
  pub skip_fs_image: bool,
}

/// Result of a successful post-build staging run.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
  pub staging_dir: PathBuf,
  pub firmware: StagedArtifact,
  pub fs_image: Option<StagedArtifact>,
  pub fs_build: FsBuild,
}

/// Create `builds/<env>/` if needed and return it. Idempotent.
pub fn ensure_staging_dir(ctx: &BuildContext) -> Result<PathBuf, StageError> {
  let dir = ctx.staging_dir();
  create_dir(&dir)?;
  Ok(dir)
}

/// Copy `source` into `dest_dir` under its original file name.
///
/// `dest_dir` is created with its parents if absent; an existing file of the
/// same name is overwritten.
pub fn copy_artifact(source: &Path, dest_dir: &Path) -> Result<StagedArtifact, StageError> {
  if !source.is_file() {
    return Err(StageError::MissingArtifact {
      path: source.to_path_buf(),
    });
  }
  let file_name = source.file_name().ok_or_else(|| StageError::NoFileName {
    path: source.to_path_buf(),
  })?;

  create_dir(dest_dir)?;
  let destination = dest_dir.join(file_name);

  let bytes = if same_file(source, &destination) {
    debug!(path = %source.display(), "artifact already in staging directory");
    fs::metadata(source)
      .map_err(|e| StageError::Copy {
        from: source.to_path_buf(),
        to: destination.clone(),
        source: e,
      })?
      .len()
  } else {
    fs::copy(source, &destination).map_err(|e| StageError::Copy {
      from: source.to_path_buf(),
      to: destination.clone(),
      source: e,
    })?
  };

  let sha256 = hash_file(&destination)?;
  info!(
    source = %source.display(),
    destination = %destination.display(),
    bytes,
    "copied artifact"
  );

  Ok(StagedArtifact {
    source: source.to_path_buf(),
    destination,
    bytes,
    sha256,
  })
}

/// Run the post-build hook: stage the firmware, then the filesystem image.
///
/// The firmware is mandatory and any failure copying it is returned. The
/// filesystem image is best effort: a failing `buildfs` or a missing image
/// leaves `fs_image` empty.
pub fn stage_artifacts(
  ctx: &BuildContext,
  runner: &impl ToolRunner,
  options: &StageOptions,
) -> Result<StageReport, StageError> {
  let staging_dir = ensure_staging_dir(ctx)?;
  let firmware = copy_artifact(&ctx.firmware_path(), &staging_dir)?;

  let (fs_image, fs_build) = if options.skip_fs_image {
    (None, FsBuild::Skipped)
  } else {
    let lookup = ensure_fs_image(ctx, runner);
    let staged = match lookup.image {
      Some(image) => Some(copy_artifact(&image, &staging_dir)?),
      None => None,
    };
    (staged, lookup.build)
  };

  Ok(StageReport {
    staging_dir,
    firmware,
    fs_image,
    fs_build,
  })
}

fn create_dir(path: &Path) -> Result<(), StageError> {
  fs::create_dir_all(path).map_err(|e| StageError::CreateDir {
    path: path.to_path_buf(),
    source: e,
  })
}

fn same_file(a: &Path, b: &Path) -> bool {
  match (dunce::canonicalize(a), dunce::canonicalize(b)) {
    (Ok(a), Ok(b)) => a == b,
    _ => false,
  }
}
