//! # Output Formatting
//!
//! Formatted output helpers with colors and emojis for user-facing messages.

use owo_colors::{OwoColorize, Stream};

/// Enum representing different color modes for output
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
  /// Enable colored output
  Yes,
  /// Enable colored output (alias for Yes)
  Always,
  /// Automatically detect if colors should be used based on terminal
  /// capabilities
  Auto,
  /// Disable colored output
  No,
  /// Disable colored output (alias for No)
  Never,
}

impl ColorMode {
  /// Apply the mode to every colored message printed afterwards.
  pub fn apply(self) {
    match self {
      Self::Always | Self::Yes => owo_colors::set_override(true),
      Self::Never | Self::No => owo_colors::set_override(false),
      Self::Auto => {}
    }
  }
}

/// Helper function to safely get an emoji or fallback to a default character
pub fn get_emoji_or_default(name: &str, default: &str) -> String {
  match emojis::get_by_shortcode(name) {
    Some(emoji) => emoji.to_string(),
    None => default.to_string(),
  }
}

/// Print a success message
pub fn print_success(message: &str) {
  let check = get_emoji_or_default("check_mark", "✓");
  println!(
    "{} {}",
    check.if_supports_color(Stream::Stdout, |text| text.green().bold().to_string()),
    message
  );
}

/// Print an error message
pub fn print_error(message: &str) {
  let cross = get_emoji_or_default("cross_mark", "✗");
  eprintln!(
    "{} {}",
    cross.if_supports_color(Stream::Stderr, |text| text.red().bold().to_string()),
    message
  );
}

/// Print a warning message
pub fn print_warning(message: &str) {
  let warning = get_emoji_or_default("warning", "⚠");
  println!(
    "{} {}",
    warning.if_supports_color(Stream::Stdout, |text| text.yellow().bold().to_string()),
    message
  );
}

/// Print an info message
pub fn print_info(message: &str) {
  let info = get_emoji_or_default("information", "ℹ");
  println!(
    "{} {}",
    info.if_supports_color(Stream::Stdout, |text| text.blue().bold().to_string()),
    message
  );
}

/// Print a section header
pub fn print_header(header: &str) {
  println!(
    "\n{}",
    header.if_supports_color(Stream::Stdout, |text| text.blue().bold().to_string())
  );
}

/// Format a filesystem path
pub fn format_path(path: &str) -> String {
  path
    .if_supports_color(Stream::Stdout, |text| text.bright_green().to_string())
    .to_string()
}

/// Format a branch name
pub fn format_branch(name: &str) -> String {
  name
    .if_supports_color(Stream::Stdout, |text| text.bright_cyan().bold().to_string())
    .to_string()
}

/// Format a command or command example
pub fn format_command(cmd: &str) -> String {
  cmd
    .if_supports_color(Stream::Stdout, |text| text.purple().to_string())
    .to_string()
}
