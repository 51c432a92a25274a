//! # Branch Command
//!
//! Resolves the server branch matching the checked out branch of the
//! repository, as used when fetching analysis results for it.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use sqbranch_core::config::get_config_dirs;
use sqbranch_core::{
  BindingTracker, BranchMatchError, BranchMatcher, ServerBranchProvider, StatefulServerBranchProvider,
  WorkingDirLocator,
};
use sqbranch_sonar::create_sonar_client_for_project;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::binding_for;
use crate::consts::DEFAULT_TIMEOUT_SECS;
use crate::utils::output::{format_branch, print_info, print_success};

/// Arguments for the branch command
#[derive(Args)]
pub struct BranchArgs {
  /// Give up after this many seconds
  #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
  pub timeout: u64,

  /// Number of HEAD commits compared against server branches
  #[arg(long, value_name = "N")]
  pub max_head_commits: Option<usize>,

  /// Print only the branch name, or nothing when no branch applies
  #[arg(short, long)]
  pub quiet: bool,
}

/// Handle the branch command
pub(crate) fn handle_branch_command(args: BranchArgs, workdir: &Path) -> Result<()> {
  let tracker = BindingTracker::new(binding_for(workdir)?);

  let Some(project) = tracker.current().project().cloned() else {
    if !args.quiet {
      print_info("Repository is not bound to a server project, the server default applies");
    }
    return Ok(());
  };

  let max_head_commits = match args.max_head_commits {
    Some(max) => max,
    None => get_config_dirs()?.load_settings()?.max_head_commits,
  };
  debug!("Comparing up to {} HEAD commits", max_head_commits);

  let client = create_sonar_client_for_project(&project)?;
  let matcher = BranchMatcher::new(Arc::new(client)).with_max_head_commits(max_head_commits);
  let provider = StatefulServerBranchProvider::new(ServerBranchProvider::new(
    tracker.clone(),
    WorkingDirLocator::new(workdir),
    matcher,
  ));
  let lifecycle = provider.start(&tracker);

  let rt = Runtime::new().context("Failed to create tokio runtime")?;
  let result = rt.block_on(async {
    let cancel = CancellationToken::new();
    let timer = {
      let cancel = cancel.clone();
      let timeout = Duration::from_secs(args.timeout);
      tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        cancel.cancel();
      })
    };

    let result = provider.get_server_branch_name(&cancel).await;
    timer.abort();
    result
  });
  lifecycle.stop();

  match result {
    Ok(Some(branch)) if args.quiet => println!("{branch}"),
    Ok(Some(branch)) => print_success(&format!(
      "Server branch for {}: {}",
      project.project_key,
      format_branch(&branch)
    )),
    Ok(None) if args.quiet => {}
    Ok(None) => print_info("No branch applies (detached HEAD or no repository), the server default applies"),
    Err(BranchMatchError::Cancelled) => {
      return Err(anyhow::anyhow!("Timed out after {}s resolving the server branch", args.timeout));
    }
    Err(e) => return Err(e).context("Failed to resolve the server branch"),
  }

  Ok(())
}
