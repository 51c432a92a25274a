use serde::Deserialize;
use sqbranch_core::{BranchType, RemoteBranch};

/// Represents Sonar authentication credentials
///
/// User tokens go in `login` with no password.
#[derive(Clone)]
pub struct SonarAuth {
  pub login: String,
  pub password: Option<String>,
}

impl SonarAuth {
  pub fn token(token: &str) -> Self {
    Self {
      login: token.to_string(),
      password: None,
    }
  }
}

impl std::fmt::Debug for SonarAuth {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SonarAuth").field("login", &"<redacted>").finish()
  }
}

/// A branch of a project as reported by `api/project_branches/list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBranch {
  pub name: String,
  #[serde(default)]
  pub is_main: bool,
  #[serde(rename = "type")]
  pub branch_type: BranchType,
  pub analysis_date: Option<String>,
}

impl From<ProjectBranch> for RemoteBranch {
  fn from(branch: ProjectBranch) -> Self {
    RemoteBranch::new(branch.name, branch.is_main, branch.branch_type)
  }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectBranchList {
  pub branches: Vec<ProjectBranch>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthenticationValidation {
  pub valid: bool,
}

/// Error payload returned by the Sonar web API
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrors {
  pub errors: Vec<ApiErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorMessage {
  pub msg: String,
}

impl ApiErrors {
  /// Messages of an error body, if `body` is one.
  pub(crate) fn message_of(body: &str) -> Option<String> {
    let errors = serde_json::from_str::<ApiErrors>(body).ok()?;
    let messages: Vec<String> = errors.errors.into_iter().map(|error| error.msg).collect();
    (!messages.is_empty()).then(|| messages.join("; "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_messages_are_joined() {
    let body = r#"{"errors":[{"msg":"first"},{"msg":"second"}]}"#;
    assert_eq!(ApiErrors::message_of(body).as_deref(), Some("first; second"));
    assert_eq!(ApiErrors::message_of(r#"{"errors":[]}"#), None);
    assert_eq!(ApiErrors::message_of("<html>"), None);
  }

  #[test]
  fn test_auth_debug_hides_token() {
    let debug = format!("{:?}", SonarAuth::token("squ_secret"));
    assert!(!debug.contains("squ_secret"));
  }
}
