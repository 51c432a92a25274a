//! # Sonar HTTP Client
//!
//! HTTP client for the SonarQube web API, handling authentication and request
//! building.

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::consts::{ACCEPT, USER_AGENT};
use crate::models::SonarAuth;

/// Represents a SonarQube or SonarCloud API client
pub struct SonarClient {
  pub(crate) client: Client,
  pub(crate) base_url: String,
  pub(crate) auth: Option<SonarAuth>,
}

impl SonarClient {
  /// Create a client for the server at `base_url`; `auth` may be omitted for
  /// servers that allow anonymous access.
  pub fn new(base_url: &str, auth: Option<SonarAuth>) -> Self {
    Self {
      client: Client::new(),
      base_url: base_url.trim_end_matches('/').to_string(),
      auth,
    }
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn is_authenticated(&self) -> bool {
    self.auth.is_some()
  }

  /// Absolute URL of an API path with query parameters.
  pub(crate) fn api_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
    let url = if params.is_empty() {
      Url::parse(&raw)
    } else {
      Url::parse_with_params(&raw, params)
    };
    url.with_context(|| format!("Invalid API URL {raw}"))
  }

  /// GET request with the standard headers and credentials.
  pub(crate) fn get(&self, url: Url) -> RequestBuilder {
    let request = self
      .client
      .get(url)
      .header("Accept", ACCEPT)
      .header("User-Agent", USER_AGENT);

    match &self.auth {
      Some(auth) => request.basic_auth(&auth.login, Some(auth.password.as_deref().unwrap_or(""))),
      None => request,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sonar_client_creation() {
    let client = SonarClient::new("https://sonar.example.com/", Some(SonarAuth::token("test_token")));

    assert_eq!(client.base_url(), "https://sonar.example.com");
    assert!(client.is_authenticated());
  }

  #[test]
  fn test_api_url_encodes_params() {
    let client = SonarClient::new("https://example.com/sonarqube", None);
    let url = client
      .api_url("/api/project_branches/list", &[("project", "org:my project")])
      .unwrap();

    assert_eq!(
      url.as_str(),
      "https://example.com/sonarqube/api/project_branches/list?project=org%3Amy+project"
    );

    let bare = client.api_url("api/server/version", &[]).unwrap();
    assert_eq!(bare.as_str(), "https://example.com/sonarqube/api/server/version");
  }
}
