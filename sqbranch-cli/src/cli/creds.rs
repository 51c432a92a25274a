//! # Credentials Command
//!
//! Checks and stores the token used to access a SonarQube or SonarCloud
//! server.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use sqbranch_core::creds::{Credentials, TOKEN_ENV_VAR, get_netrc_path, normalize_host, store_credentials};
use sqbranch_sonar::create_sonar_client;
use tokio::runtime::Runtime;

use super::server_url_for;
use crate::consts::NETRC_EXAMPLE;
use crate::utils::output::{format_command, format_path, print_error, print_info, print_success, print_warning};

/// Command for credential management
#[derive(Args)]
pub struct CredsArgs {
  /// The subcommand to execute
  #[command(subcommand)]
  pub subcommand: CredsSubcommands,
}

/// Subcommands for the creds command
#[derive(Subcommand)]
pub enum CredsSubcommands {
  /// Check that a token is configured and accepted by the server
  #[command(long_about = "Checks the token configured for the server.\n\n\
                      The server is taken from --server, the repository binding, the\n\
                      default_server_url setting or SonarCloud, in that order. The token\n\
                      is validated against the server when one is found.")]
  Check {
    /// URL of the server to check
    #[arg(long, value_name = "URL")]
    server: Option<String>,
  },

  /// Store a token for the server in .netrc
  Set {
    /// User token generated on the server
    #[arg(required = true, index = 1)]
    token: String,

    /// URL of the server the token belongs to
    #[arg(long, value_name = "URL")]
    server: Option<String>,
  },
}

/// Handle the creds command
pub(crate) fn handle_creds_command(creds: CredsArgs, workdir: &Path) -> Result<()> {
  match creds.subcommand {
    CredsSubcommands::Check { server } => handle_check_command(&server_url_for(server, workdir)?),
    CredsSubcommands::Set { token, server } => handle_set_command(&token, &server_url_for(server, workdir)?),
  }
}

/// Handle the check command
fn handle_check_command(server_url: &str) -> Result<()> {
  let host = normalize_host(server_url);
  let netrc_path = get_netrc_path()?;

  print_info(&format!("Checking credentials for {host}"));

  if std::env::var(TOKEN_ENV_VAR).is_ok_and(|token| !token.trim().is_empty()) {
    print_info(&format!("Using the token from {TOKEN_ENV_VAR}"));
  } else if !netrc_path.exists() {
    print_warning("No .netrc file found.");
    println!(
      "Create {} or run {}",
      format_path(&netrc_path.display().to_string()),
      format_command("sqbranch creds set <token>")
    );
  } else {
    check_netrc_permissions(&netrc_path)?;
  }

  let client = create_sonar_client(server_url)?;
  if !client.is_authenticated() {
    print_warning("No token found, the server will be accessed anonymously.");
    print_info("Example .netrc entry:");
    println!("```");
    println!("{NETRC_EXAMPLE}");
    println!("```");
  }

  let rt = Runtime::new().context("Failed to create tokio runtime")?;
  match rt.block_on(client.test_connection()) {
    Ok(true) => print_success(&format!("Authenticated with {}", client.base_url())),
    Ok(false) => {
      print_error(&format!("{} rejected the credentials", client.base_url()));
      return Ok(());
    }
    Err(e) => {
      print_error(&format!("Failed to connect to {}: {e}", client.base_url()));
      return Ok(());
    }
  }

  match rt.block_on(client.get_server_version()) {
    Ok(version) => println!("  Server version: {version}"),
    Err(e) => print_warning(&format!("Could not read the server version: {e}")),
  }

  Ok(())
}

#[cfg(unix)]
fn check_netrc_permissions(netrc_path: &Path) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;

  let mode = std::fs::metadata(netrc_path)?.permissions().mode();
  if mode & 0o077 != 0 {
    print_warning("Your .netrc file has insecure permissions.");
    println!(
      "For security, change permissions to 600: {}",
      format_command(&format!("chmod 600 {}", netrc_path.display()))
    );
  } else {
    print_success(".netrc file has secure permissions.");
  }

  Ok(())
}

#[cfg(not(unix))]
fn check_netrc_permissions(_netrc_path: &Path) -> Result<()> {
  Ok(())
}

/// Handle the set command
fn handle_set_command(token: &str, server_url: &str) -> Result<()> {
  let token = token.trim();
  if token.is_empty() {
    return Err(anyhow::anyhow!("Token must not be empty"));
  }

  let host = normalize_host(server_url);
  store_credentials(&host, &Credentials::token(token))?;

  print_success(&format!("Stored token for {host}"));
  println!(
    "Verify it with {}",
    format_command("sqbranch creds check")
  );

  Ok(())
}
