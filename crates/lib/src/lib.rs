//! fwstage-lib: build hooks for PlatformIO firmware projects
//!
//! This crate provides the pieces a firmware build pipeline calls around
//! PlatformIO:
//! - `context`: explicit build variables (environment, directories, program name)
//! - `stage`: copying firmware and filesystem images into `builds/<env>/`
//! - `version`: timestamped `VERSION` define and `version.txt`
//! - `upload`: filesystem upload strictly before firmware upload
//! - `tool`: the `pio run -e <env> -t <target>` subprocess seam

pub mod consts;
pub mod context;
pub mod stage;
pub mod tool;
pub mod upload;
pub mod util;
pub mod version;

pub use context::{BuildContext, ContextError, ContextOverrides};
pub use tool::{PioTool, Target, TargetStatus, ToolError, ToolRunner};
