use std::future::Future;

use anyhow::Result;
use sqbranch_core::{ProjectBranchSource, RemoteBranch};

use crate::client::SonarClient;

impl ProjectBranchSource for SonarClient {
  fn project_branches(&self, project_key: &str) -> impl Future<Output = Result<Vec<RemoteBranch>>> + Send {
    async move {
      let branches = self.get_project_branches(project_key).await?;
      Ok(branches.into_iter().map(RemoteBranch::from).collect())
    }
  }
}
