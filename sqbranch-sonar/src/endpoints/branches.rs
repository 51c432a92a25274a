use anyhow::{Context, Result};
use reqwest::StatusCode;
use tracing::{debug, instrument};

use crate::client::SonarClient;
use crate::models::{ApiErrors, ProjectBranch, ProjectBranchList};

impl SonarClient {
  /// List every branch of a project, pull requests excluded, in server order
  #[instrument(skip(self), level = "debug")]
  pub async fn get_project_branches(&self, project_key: &str) -> Result<Vec<ProjectBranch>> {
    let url = self.api_url("api/project_branches/list", &[("project", project_key)])?;

    let response = self
      .get(url)
      .send()
      .await
      .context("Failed to fetch project branches")?;

    match response.status() {
      StatusCode::OK => {
        let body = response.text().await.context("Failed to read response body")?;

        let list = match serde_json::from_str::<ProjectBranchList>(&body) {
          Ok(list) => list,
          Err(e) => {
            if let Some(message) = ApiErrors::message_of(&body) {
              return Err(anyhow::anyhow!("Failed to parse project branches: Sonar API error: {message}"));
            }
            return Err(anyhow::anyhow!("Failed to parse project branches: {e}"));
          }
        };

        debug!("Server reported {} branches for {}", list.branches.len(), project_key);
        Ok(list.branches)
      }
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(anyhow::anyhow!(
        "Authentication failed. Please check your Sonar token."
      )),
      StatusCode::NOT_FOUND => {
        let body = response.text().await.unwrap_or_default();
        match ApiErrors::message_of(&body) {
          Some(message) => Err(anyhow::anyhow!("Project '{project_key}' not found: {message}")),
          None => Err(anyhow::anyhow!("Project '{project_key}' not found")),
        }
      }
      status => Err(anyhow::anyhow!(
        "Unexpected error: HTTP {} - {}",
        status,
        response.text().await.unwrap_or_default()
      )),
    }
  }
}
