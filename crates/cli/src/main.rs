mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fwstage_lib::{BuildContext, ContextOverrides};

use crate::cmd::{cmd_info, cmd_stage, cmd_upload, cmd_version};
use crate::output::OutputFormat;

/// fwstage - build hooks for PlatformIO firmware projects
#[derive(Parser)]
#[command(name = "fwstage")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Build environment name [env: PIOENV]
  #[arg(short, long, global = true)]
  environment: Option<String>,

  /// Project root [env: PROJECT_DIR] (default: current directory)
  #[arg(long, global = true)]
  project_dir: Option<PathBuf>,

  /// Directory holding the built binaries [env: BUILD_DIR] (default: .pio/build/<env>)
  #[arg(long, global = true)]
  build_dir: Option<PathBuf>,

  /// Program name; the firmware is <progname>.bin [env: PROGNAME]
  #[arg(long, global = true)]
  progname: Option<String>,

  /// Build tool executable [env: FWSTAGE_TOOL] (default: pio)
  #[arg(long, global = true)]
  tool: Option<PathBuf>,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Copy the firmware and filesystem image into builds/<env>/
  Stage {
    /// Stage only the firmware binary
    #[arg(long)]
    skip_fs: bool,
  },

  /// Write builds/<env>/version.txt and print the matching VERSION define
  Version,

  /// Upload the filesystem image, then the firmware
  Upload {
    /// Only upload the filesystem image (pre-upload hook mode)
    #[arg(long)]
    fs_only: bool,
  },

  /// Show the resolved build context
  Info,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  // Logs go to stderr: `version` prints the define flag on stdout.
  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let ctx = BuildContext::resolve(ContextOverrides {
    env_name: cli.environment,
    project_dir: cli.project_dir,
    build_dir: cli.build_dir,
    prog_name: cli.progname,
    tool: cli.tool,
  })?;

  match cli.command {
    Commands::Stage { skip_fs } => cmd_stage(&ctx, skip_fs, cli.output),
    Commands::Version => cmd_version(&ctx, cli.output),
    Commands::Upload { fs_only } => cmd_upload(&ctx, fs_only),
    Commands::Info => cmd_info(&ctx, cli.output),
  }
}
