//! Timestamped firmware versions.
//!
//! One version string is computed per build and emitted twice: as the
//! `VERSION` compiler define baked into the firmware, and as `version.txt`
//! in the staging directory. The device compares the two to decide whether
//! an OTA update is available, so both must come from the same [`Version`].

use std::fmt;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::consts::{VERSION_DEFINE, VERSION_FILE_NAME, VERSION_FORMAT};
use crate::context::BuildContext;
use crate::stage::{StageError, ensure_staging_dir};

#[derive(Debug, Error)]
pub enum VersionError {
  #[error(transparent)]
  Stage(#[from] StageError),

  #[error("failed to write version file {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },
}

/// A `YYYY-MM-DD_HH-MM-SS` build version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
  /// Version for the current local wall-clock time.
  pub fn now() -> Self {
    Self::from_datetime(&Local::now())
  }

  pub(crate) fn from_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> Self
  where
    Tz::Offset: fmt::Display,
  {
    Self(at.format(VERSION_FORMAT).to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The define as a compiler flag, quotes escaped so the macro expands to a
  /// string literal: `-DVERSION=\"2025-03-14_09-26-53\"`.
  pub fn define_flag(&self) -> String {
    format!("-D{}={}", VERSION_DEFINE, self.define_value())
  }

  /// The define's value with escaped quotes: `\"2025-03-14_09-26-53\"`.
  pub fn define_value(&self) -> String {
    format!("\\\"{}\\\"", self.0)
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Output of [`stamp_version`].
#[derive(Debug, Clone, Serialize)]
pub struct VersionStamp {
  pub version: Version,
  /// Compiler flag carrying the same version.
  pub define: String,
  pub file: PathBuf,
}

/// Write `version.txt` for `version` into the staging directory.
///
/// The file holds the version followed by a newline and replaces any
/// previous content.
pub fn stamp_version(ctx: &BuildContext, version: Version) -> Result<VersionStamp, VersionError> {
  let dir = ensure_staging_dir(ctx)?;
  let file = dir.join(VERSION_FILE_NAME);

  fs::write(&file, format!("{version}\n")).map_err(|e| VersionError::WriteFile {
    path: file.clone(),
    source: e,
  })?;

  info!(file = %file.display(), version = %version, "wrote version file");

  Ok(VersionStamp {
    define: version.define_flag(),
    version,
    file,
  })
}
