//! # Bind Command
//!
//! Binds a repository to a server project, or returns it to standalone mode.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use sqbranch_core::binding::{binding_path, load_binding, save_binding};
use sqbranch_core::{BindingConfiguration, BindingEvent, BindingTracker, BoundProject};
use tracing::info;

use super::{require_repository_root, server_url_for};
use crate::utils::output::{format_command, format_path, print_info, print_success};

/// Arguments for the bind command
#[derive(Args)]
pub struct BindArgs {
  /// Key of the project on the server
  #[arg(required = true, index = 1)]
  pub project_key: String,

  /// URL of the SonarQube server (defaults to SonarCloud)
  #[arg(long, value_name = "URL")]
  pub server: Option<String>,

  /// SonarCloud organization owning the project
  #[arg(long, value_name = "ORG")]
  pub organization: Option<String>,
}

/// Handle the bind command
pub(crate) fn handle_bind_command(args: BindArgs, workdir: &Path) -> Result<()> {
  let repo_root = require_repository_root(workdir)?;
  let server_url = server_url_for(args.server, workdir)?;
  let project = BoundProject::new(&server_url, &args.project_key, args.organization.as_deref())?;

  let tracker = BindingTracker::new(load_binding(&repo_root)?);
  let event = tracker.refresh(BindingConfiguration::Connected(project.clone()));
  save_binding(&repo_root, &tracker.current())?;
  info!("Binding of {} {:?}", repo_root.display(), event);

  match event {
    BindingEvent::Changed => print_success(&format!(
      "Bound {} to project {} on {}",
      format_path(&repo_root.display().to_string()),
      project.project_key,
      project.server_url
    )),
    BindingEvent::Updated => print_success(&format!("Refreshed binding to project {}", project.project_key)),
  }

  if let Some(organization) = &project.organization {
    println!("  Organization: {organization}");
  }
  print_info(&format!(
    "Run {} to find the matching server branch",
    format_command("sqbranch branch")
  ));

  Ok(())
}

/// Handle the unbind command
pub(crate) fn handle_unbind_command(workdir: &Path) -> Result<()> {
  let repo_root = require_repository_root(workdir)?;

  if !binding_path(&repo_root).exists() {
    print_info("Repository is not bound to a server project");
    return Ok(());
  }

  save_binding(&repo_root, &BindingConfiguration::Standalone)?;
  print_success(&format!(
    "{} is now standalone",
    format_path(&repo_root.display().to_string())
  ));

  Ok(())
}
