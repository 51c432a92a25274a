use anyhow::{Context, Result};
use reqwest::StatusCode;
use tracing::instrument;

use crate::client::SonarClient;
use crate::models::AuthenticationValidation;

impl SonarClient {
  /// Test the Sonar connection by validating the configured credentials
  #[instrument(skip(self), level = "debug")]
  pub async fn test_connection(&self) -> Result<bool> {
    let url = self.api_url("api/authentication/validate", &[])?;

    let response = self.get(url).send().await.context("Failed to connect to the server")?;

    match response.status() {
      StatusCode::OK => {
        let validation: AuthenticationValidation =
          response.json().await.context("Failed to parse authentication validation")?;
        Ok(validation.valid)
      }
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
      status => Err(anyhow::anyhow!(
        "Unexpected error: HTTP {} - {}",
        status,
        response.text().await.unwrap_or_default()
      )),
    }
  }

  /// Version string of the server, e.g. `10.4.1.88267`
  #[instrument(skip(self), level = "debug")]
  pub async fn get_server_version(&self) -> Result<String> {
    let url = self.api_url("api/server/version", &[])?;

    let response = self.get(url).send().await.context("Failed to fetch server version")?;

    match response.status() {
      StatusCode::OK => {
        let body = response.text().await.context("Failed to read response body")?;
        Ok(body.trim().to_string())
      }
      status => Err(anyhow::anyhow!(
        "Unexpected error: HTTP {} - {}",
        status,
        response.text().await.unwrap_or_default()
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use wiremock::matchers::{header, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use crate::client::SonarClient;
  use crate::models::SonarAuth;

  fn client_for(mock_server: &MockServer, token: &str) -> SonarClient {
    let mut client = SonarClient::new("https://sonarcloud.io", Some(SonarAuth::token(token)));
    client.base_url = mock_server.uri();
    client
  }

  #[tokio::test]
  async fn test_connection_with_valid_token() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server, "test_token");

    Mock::given(method("GET"))
      .and(path("/api/authentication/validate"))
      .and(header("Authorization", "Basic dGVzdF90b2tlbjo="))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "valid": true })))
      .mount(&mock_server)
      .await;

    assert!(client.test_connection().await?);
    Ok(())
  }

  #[tokio::test]
  async fn test_connection_with_rejected_token() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server, "bad_token");

    Mock::given(method("GET"))
      .and(path("/api/authentication/validate"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "valid": false })))
      .mount(&mock_server)
      .await;

    assert!(!client.test_connection().await?);
    Ok(())
  }

  #[tokio::test]
  async fn test_get_server_version() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server, "test_token");

    Mock::given(method("GET"))
      .and(path("/api/server/version"))
      .respond_with(ResponseTemplate::new(200).set_body_string("10.4.1.88267\n"))
      .mount(&mock_server)
      .await;

    assert_eq!(client.get_server_version().await?, "10.4.1.88267");
    Ok(())
  }
}
