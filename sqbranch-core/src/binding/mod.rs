//! # Solution Binding
//!
//! The association between a local working copy and a server project.
//! A repository is either *standalone* (no server) or *connected* to a project
//! on a SonarQube/SonarCloud server. The binding is persisted per repository
//! in `.sqbranch/binding.json` and tracked in memory by [`BindingTracker`],
//! which notifies subscribers whenever it changes.

pub mod store;
pub mod tracker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub use store::{binding_path, ensure_internal_gitignore, load_binding, save_binding};
pub use tracker::{BindingEvent, BindingSubscription, BindingTracker};

/// Errors raised when building a binding from user input.
#[derive(Debug, Error)]
pub enum BindingError {
  #[error("invalid server URL '{url}': {reason}")]
  InvalidServerUrl { url: String, reason: String },
  #[error("project key must not be empty")]
  EmptyProjectKey,
}

/// Where a repository's analysis results live on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundProject {
  pub server_url: String,
  pub project_key: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub organization: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bound_at: Option<DateTime<Utc>>,
}

impl BoundProject {
  /// Validate and normalise a binding target.
  ///
  /// The server URL must be absolute http(s); a trailing slash is dropped so
  /// endpoint paths can be appended directly.
  pub fn new(server_url: &str, project_key: &str, organization: Option<&str>) -> Result<Self, BindingError> {
    let project_key = project_key.trim();
    if project_key.is_empty() {
      return Err(BindingError::EmptyProjectKey);
    }

    let parsed = Url::parse(server_url).map_err(|e| BindingError::InvalidServerUrl {
      url: server_url.to_string(),
      reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(BindingError::InvalidServerUrl {
        url: server_url.to_string(),
        reason: format!("unsupported scheme '{}'", parsed.scheme()),
      });
    }

    Ok(Self {
      server_url: parsed.as_str().trim_end_matches('/').to_string(),
      project_key: project_key.to_string(),
      organization: organization.map(str::to_string).filter(|org| !org.is_empty()),
      bound_at: Some(Utc::now()),
    })
  }

  /// Machine name the server's credentials are stored under.
  pub fn credentials_host(&self) -> String {
    crate::creds::normalize_host(&self.server_url)
  }

  /// Whether `other` points at the same server project.
  pub fn is_same_project(&self, other: &Self) -> bool {
    self.server_url.eq_ignore_ascii_case(&other.server_url)
      && self.project_key == other.project_key
      && self.organization == other.organization
  }
}

/// Binding mode of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BindingConfiguration {
  #[default]
  Standalone,
  Connected(BoundProject),
}

impl BindingConfiguration {
  pub const fn is_standalone(&self) -> bool {
    matches!(self, Self::Standalone)
  }

  pub const fn project(&self) -> Option<&BoundProject> {
    match self {
      Self::Standalone => None,
      Self::Connected(project) => Some(project),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bound_project_normalises_url() {
    let project = BoundProject::new("https://sonar.example.com/", "my_project", None).unwrap();
    assert_eq!(project.server_url, "https://sonar.example.com");
    assert_eq!(project.credentials_host(), "sonar.example.com");
    assert!(project.bound_at.is_some());
  }

  #[test]
  fn bound_project_keeps_context_path() {
    let project = BoundProject::new("https://example.com:8443/sonarqube/", "key", None).unwrap();
    assert_eq!(project.server_url, "https://example.com:8443/sonarqube");
    assert_eq!(project.credentials_host(), "example.com:8443");
  }

  #[test]
  fn bound_project_rejects_bad_input() {
    assert!(matches!(
      BoundProject::new("https://sonarcloud.io", "  ", None),
      Err(BindingError::EmptyProjectKey)
    ));
    assert!(matches!(
      BoundProject::new("not a url", "key", None),
      Err(BindingError::InvalidServerUrl { .. })
    ));
    assert!(matches!(
      BoundProject::new("ftp://sonar.example.com", "key", None),
      Err(BindingError::InvalidServerUrl { .. })
    ));
  }

  #[test]
  fn empty_organization_is_dropped() {
    let project = BoundProject::new("https://sonarcloud.io", "key", Some("")).unwrap();
    assert_eq!(project.organization, None);
  }

  #[test]
  fn same_project_ignores_binding_time() {
    let first = BoundProject::new("https://sonarcloud.io", "key", Some("org")).unwrap();
    let mut second = first.clone();
    second.bound_at = None;
    assert!(first.is_same_project(&second));

    let other = BoundProject::new("https://sonarcloud.io", "other", Some("org")).unwrap();
    assert!(!first.is_same_project(&other));
  }

  #[test]
  fn binding_serialization_is_tagged() {
    let standalone = serde_json::to_value(BindingConfiguration::Standalone).unwrap();
    assert_eq!(standalone, serde_json::json!({ "mode": "standalone" }));

    let mut project = BoundProject::new("https://sonarcloud.io", "key", Some("org")).unwrap();
    project.bound_at = None;
    let connected = serde_json::to_value(BindingConfiguration::Connected(project)).unwrap();
    assert_eq!(
      connected,
      serde_json::json!({
        "mode": "connected",
        "server_url": "https://sonarcloud.io",
        "project_key": "key",
        "organization": "org"
      })
    );
  }
}
