//! Authentication helpers for the Sonar client.
//!
//! Loads the token for a server from the user's environment and builds a
//! ready-to-use client. Servers allowing anonymous access work without one.

use anyhow::Result;
use sqbranch_core::BoundProject;
use sqbranch_core::creds::{Credentials, normalize_host, resolve_credentials};
use tracing::{debug, warn};

use crate::client::SonarClient;
use crate::models::SonarAuth;

impl From<Credentials> for SonarAuth {
  fn from(credentials: Credentials) -> Self {
    Self {
      login: credentials.login,
      password: credentials.password,
    }
  }
}

/// Creates a client for `server_url`, authenticated when a token is known for
/// its host.
pub fn create_sonar_client(server_url: &str) -> Result<SonarClient> {
  let host = normalize_host(server_url);
  let auth = resolve_credentials(&host)?.map(SonarAuth::from);

  match &auth {
    Some(_) => debug!("Using stored credentials for {}", host),
    None => warn!("No credentials found for {}, using anonymous access", host),
  }

  Ok(SonarClient::new(server_url, auth))
}

/// Creates a client for the server a project is bound to.
pub fn create_sonar_client_for_project(project: &BoundProject) -> Result<SonarClient> {
  create_sonar_client(&project.server_url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_token_credentials_convert_to_auth() {
    let auth = SonarAuth::from(Credentials::token("squ_abc"));
    assert_eq!(auth.login, "squ_abc");
    assert_eq!(auth.password, None);
  }

  #[test]
  fn test_basic_credentials_convert_to_auth() {
    let auth = SonarAuth::from(Credentials {
      login: "admin".to_string(),
      password: Some("secret".to_string()),
    });
    assert_eq!(auth.login, "admin");
    assert_eq!(auth.password.as_deref(), Some("secret"));
  }
}
