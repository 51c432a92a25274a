//! # Command Line Interface
//!
//! Defines the CLI structure and command handlers for the sqbranch tool:
//! binding a repository to a server project, inspecting it, and resolving the
//! server branch that matches the local branch.

mod bind;
mod branch;
mod creds;
mod status;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, Parser, Subcommand};
use sqbranch_core::BindingConfiguration;
use sqbranch_core::binding::load_binding;
use sqbranch_core::config::get_config_dirs;
use sqbranch_core::git::resolve_repository_root;
use sqbranch_sonar::consts::SONARCLOUD_URL;

use crate::utils::output::ColorMode;

/// Top-level CLI command for the sqbranch tool
#[derive(Parser)]
#[command(name = "sqbranch")]
#[command(display_name = "🔎 sqbranch")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(about = "Find the SonarQube/SonarCloud branch matching your local git branch")]
#[command(
  long_about = "sqbranch binds a git working copy to a SonarQube or SonarCloud project and\n\
        resolves which branch known by the server best corresponds to the branch you\n\
        have checked out, using an exact name match or the closest shared history."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
#[command(subcommand_required(true))]
#[command(disable_help_subcommand = true)]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count,
    global = true,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show info level messages\n\
             -vv: Show debug level messages\n\
             -vvv: Show trace level messages"
  )]
  pub verbose: u8,

  /// Controls when colored output is used
  #[arg(
    long,
    value_enum,
    ignore_case = true,
    global = true,
    default_value_t = ColorMode::Auto,
  )]
  pub colors: ColorMode,

  /// Run as if sqbranch was started in this directory
  #[arg(short = 'C', value_name = "PATH", global = true)]
  pub directory: Option<PathBuf>,

  /// Subcommands
  #[command(subcommand)]
  pub command: Commands,
}

/// Subcommands for the sqbranch tool
#[derive(Subcommand)]
pub enum Commands {
  /// Bind the repository to a server project
  #[command(long_about = "Bind the current git repository to a SonarQube or SonarCloud project.\n\n\
            The binding is stored in .sqbranch/binding.json at the repository root and is\n\
            ignored by git. Without --server, the default_server_url from the global\n\
            config.toml is used, falling back to SonarCloud.")]
  Bind(bind::BindArgs),

  /// Resolve the server branch matching the local branch
  #[command(long_about = "Resolve the server branch that best matches the checked out branch.\n\n\
            A server branch with the same name (ignoring case) wins outright. Otherwise the\n\
            server branch whose local counterpart shares the most recent history with HEAD\n\
            is chosen, falling back to the project's main branch.")]
  #[command(alias = "br")]
  Branch(branch::BranchArgs),

  /// Credential management
  #[command(long_about = "Check and store the token used to access the server.\n\n\
            Tokens are stored in your .netrc file under the server host name. The\n\
            SONAR_TOKEN environment variable takes precedence over the stored token.")]
  #[command(arg_required_else_help = true)]
  Creds(creds::CredsArgs),

  /// Show the binding and git state of the repository
  #[command(alias = "st")]
  Status,

  /// Switch the repository back to standalone mode
  Unbind,
}

pub fn handle_cli(cli: Cli) -> Result<()> {
  cli.colors.apply();

  let workdir = match cli.directory {
    Some(directory) => directory,
    None => env::current_dir().context("Failed to get current directory")?,
  };

  match cli.command {
    Commands::Bind(bind) => bind::handle_bind_command(bind, &workdir),
    Commands::Branch(branch) => branch::handle_branch_command(branch, &workdir),
    Commands::Creds(creds) => creds::handle_creds_command(creds, &workdir),
    Commands::Status => status::handle_status_command(&workdir),
    Commands::Unbind => bind::handle_unbind_command(&workdir),
  }
}

/// Repository root holding the binding for `workdir`.
fn require_repository_root(workdir: &Path) -> Result<PathBuf> {
  resolve_repository_root(workdir)
    .with_context(|| format!("{} is not inside a git repository", workdir.display()))
}

/// Binding of the repository containing `workdir`; standalone outside git.
fn binding_for(workdir: &Path) -> Result<BindingConfiguration> {
  match resolve_repository_root(workdir) {
    Some(root) => load_binding(root),
    None => Ok(BindingConfiguration::Standalone),
  }
}

/// Server to talk to: an explicit URL, else the repository's binding, else
/// the configured default, else SonarCloud.
fn server_url_for(explicit: Option<String>, workdir: &Path) -> Result<String> {
  if let Some(url) = explicit {
    return Ok(url);
  }

  if let Some(project) = binding_for(workdir)?.project() {
    return Ok(project.server_url.clone());
  }

  let settings = get_config_dirs()?.load_settings()?;
  Ok(settings.default_server_url.unwrap_or_else(|| SONARCLOUD_URL.to_string()))
}
