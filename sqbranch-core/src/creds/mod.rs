//! # Credential Management
//!
//! Retrieval and storage of server tokens. Tokens live in the user's `.netrc`
//! under the server host name; the `SONAR_TOKEN` environment variable takes
//! precedence when set.

pub mod netrc;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use tracing::debug;

pub use netrc::{normalize_host, parse_netrc_file, write_netrc_entry};

/// Environment variable overriding any stored token.
pub const TOKEN_ENV_VAR: &str = "SONAR_TOKEN";

/// Credentials for a server.
///
/// SonarQube tokens are sent as the login with an empty password, so the
/// password is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
  pub login: String,
  pub password: Option<String>,
}

impl Credentials {
  /// Credentials consisting of a user token only.
  pub fn token(token: impl Into<String>) -> Self {
    Self {
      login: token.into(),
      password: None,
    }
  }
}

/// Get the path to the user's `.netrc` file
pub fn get_netrc_path() -> Result<PathBuf> {
  let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
  Ok(netrc::netrc_path_in(base_dirs.home_dir()))
}

/// Credentials for `host`, from the environment or the user's `.netrc`.
///
/// # Arguments
///
/// * `host` - Server URL or host; normalized with [`normalize_host`]
///
/// # Errors
///
/// Returns an error if the home directory is unknown or `.netrc` cannot be
/// read. No credentials at all is `Ok(None)`.
pub fn resolve_credentials(host: &str) -> Result<Option<Credentials>> {
  let env_token = std::env::var(TOKEN_ENV_VAR).ok();
  resolve_credentials_from(env_token, &get_netrc_path()?, host)
}

/// Resolution behind [`resolve_credentials`] with explicit inputs.
pub fn resolve_credentials_from(env_token: Option<String>, netrc_path: &Path, host: &str) -> Result<Option<Credentials>> {
  if let Some(token) = env_token.filter(|token| !token.trim().is_empty()) {
    debug!("Using token from {}", TOKEN_ENV_VAR);
    return Ok(Some(Credentials::token(token.trim())));
  }

  if !netrc_path.exists() {
    debug!("No .netrc at {}", netrc_path.display());
    return Ok(None);
  }

  parse_netrc_file(netrc_path, &normalize_host(host))
}

/// Store `credentials` for `host` in the user's `.netrc`.
///
/// # Errors
///
/// Returns an error if the home directory is unknown or `.netrc` cannot be
/// written.
pub fn store_credentials(host: &str, credentials: &Credentials) -> Result<()> {
  write_netrc_entry(&get_netrc_path()?, &normalize_host(host), credentials)
}
