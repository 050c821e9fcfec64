//! Names and defaults shared by the hooks.

/// Directory under the project root that collects staged artifacts.
pub const STAGING_DIR_NAME: &str = "builds";

/// Canonical file name of the filesystem image produced by `buildfs`.
pub const FS_IMAGE_NAME: &str = "littlefs.bin";
/// Substring used by the fallback filesystem image search.
pub const FS_IMAGE_MARKER: &str = "littlefs";
/// Extension (without dot) of firmware and filesystem images.
pub const BIN_EXTENSION: &str = "bin";

pub const VERSION_FILE_NAME: &str = "version.txt";
pub const VERSION_DEFINE: &str = "VERSION";
/// `strftime` pattern for version strings, e.g. `2025-03-14_09-26-53`.
pub const VERSION_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub const DEFAULT_TOOL: &str = "pio";
pub const DEFAULT_PROG_NAME: &str = "firmware";

// Variables exported by PlatformIO to hook processes.
pub const ENV_PIOENV: &str = "PIOENV";
pub const ENV_PROJECT_DIR: &str = "PROJECT_DIR";
pub const ENV_BUILD_DIR: &str = "BUILD_DIR";
pub const ENV_PROGNAME: &str = "PROGNAME";
/// Overrides the build tool executable.
pub const ENV_TOOL: &str = "FWSTAGE_TOOL";
