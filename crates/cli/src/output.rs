//! Terminal output for the hook commands.
//!
//! Lines are built by plain functions and only colored when written, so the
//! text PlatformIO shows in its build log is the text the tests see.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{AnsiColors, OwoColorize, Stream};

use fwstage_lib::stage::StagedArtifact;
use fwstage_lib::util::hash::ContentHash;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// Kind of a one-line status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Done,
  Note,
  Warning,
  Failure,
}

impl Status {
  fn symbol(self) -> &'static str {
    match self {
      Status::Done => "✓",
      Status::Note => "•",
      Status::Warning => "⚠",
      Status::Failure => "✗",
    }
  }

  fn color(self) -> AnsiColors {
    match self {
      Status::Done => AnsiColors::Green,
      Status::Note => AnsiColors::Blue,
      Status::Warning => AnsiColors::Yellow,
      Status::Failure => AnsiColors::Red,
    }
  }

  /// Warnings and failures go to stderr so they show up next to the build
  /// tool's own errors.
  fn stream(self) -> Stream {
    match self {
      Status::Done | Status::Note => Stream::Stdout,
      Status::Warning | Status::Failure => Stream::Stderr,
    }
  }
}

const BANNER_RULE: &str = "============================================================";

pub fn status_line(status: Status, message: &str) -> String {
  format!("{} {}", status.symbol(), message)
}

/// Print a status line on the stream its kind belongs to.
pub fn report(status: Status, message: &str) {
  write_status(status.stream(), status, message);
}

/// Print a status line on stderr regardless of kind. For commands whose
/// stdout is read by the build tool.
pub fn report_stderr(status: Status, message: &str) {
  write_status(Stream::Stderr, status, message);
}

fn write_status(stream: Stream, status: Status, message: &str) {
  let line = status_line(status, message);
  let line = line.if_supports_color(stream, |s| s.color(status.color()));
  match stream {
    Stream::Stdout => println!("{line}"),
    _ => eprintln!("{line}"),
  }
}

/// `Copied <src> → <dst> (<size>, sha256 <digest>)`
pub fn copied_line(artifact: &StagedArtifact) -> String {
  format!(
    "Copied {} → {} ({}, sha256 {})",
    artifact.source.display(),
    artifact.destination.display(),
    artifact_size(artifact.bytes),
    short_sha256(&artifact.sha256)
  )
}

/// Flash-sized units: images range from a few KiB of filesystem to a few MiB
/// of firmware.
pub fn artifact_size(bytes: u64) -> String {
  const KIB: u64 = 1024;
  const MIB: u64 = KIB * 1024;

  if bytes >= MIB {
    format!("{:.2} MiB", bytes as f64 / MIB as f64)
  } else if bytes >= KIB {
    format!("{:.1} KiB", bytes as f64 / KIB as f64)
  } else {
    format!("{bytes} B")
  }
}

/// Enough of the digest to tell two builds apart in a log.
pub fn short_sha256(hash: &ContentHash) -> &str {
  let hex = hash.0.as_str();
  &hex[..hex.len().min(8)]
}

/// Upload time, to a tenth of a second; uploads run from seconds to minutes.
pub fn elapsed(duration: Duration) -> String {
  let secs = duration.as_secs();
  if secs >= 60 {
    format!("{}m {:02}s", secs / 60, secs % 60)
  } else {
    format!("{:.1}s", duration.as_secs_f64())
  }
}

/// The message between two rules, as framed around each upload step.
pub fn banner_lines(message: &str) -> [String; 3] {
  [BANNER_RULE.to_string(), message.to_string(), BANNER_RULE.to_string()]
}

pub fn print_banner(message: &str) {
  let [top, text, bottom] = banner_lines(message);
  println!();
  println!("{}", top.if_supports_color(Stream::Stdout, |s| s.dimmed()));
  println!("{}", text.if_supports_color(Stream::Stdout, |s| s.bold()));
  println!("{}", bottom.if_supports_color(Stream::Stdout, |s| s.dimmed()));
}

pub fn field_line(label: &str, value: &str) -> String {
  format!("  {label:<12} {value}")
}

pub fn print_field(label: &str, value: &str) {
  println!("{}", field_line(label, value));
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}
