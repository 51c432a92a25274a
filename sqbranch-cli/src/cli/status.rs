//! # Status Command
//!
//! Shows the binding of the repository along with the git state the branch
//! matcher works from.

use std::path::Path;

use anyhow::Result;
use sqbranch_core::binding::load_binding;
use sqbranch_core::{BindingConfiguration, Git2Reader, GitReader};

use super::require_repository_root;
use crate::utils::output::{format_branch, format_path, print_header, print_info, print_warning};

/// Handle the status command
pub(crate) fn handle_status_command(workdir: &Path) -> Result<()> {
  let repo_root = require_repository_root(workdir)?;

  print_header("Repository");
  println!("  Path: {}", format_path(&repo_root.display().to_string()));

  print_header("Binding");
  match load_binding(&repo_root)? {
    BindingConfiguration::Standalone => println!("  Mode: standalone"),
    BindingConfiguration::Connected(project) => {
      println!("  Mode: connected");
      println!("  Server: {}", project.server_url);
      println!("  Project: {}", project.project_key);
      if let Some(organization) = &project.organization {
        println!("  Organization: {organization}");
      }
      if let Some(bound_at) = project.bound_at {
        println!("  Bound at: {}", bound_at.format("%Y-%m-%d %H:%M:%S UTC"));
      }
    }
  }

  let reader = Git2Reader::open(&repo_root)?;

  print_header("Git");
  match reader.head_branch_name()? {
    Some(head) => println!("  HEAD: {}", format_branch(&head)),
    None => print_warning("HEAD is detached, no server branch applies"),
  }

  let mut branches = reader.local_branch_names()?;
  branches.sort();
  if branches.is_empty() {
    print_info("No local branches yet");
  } else {
    println!("  Local branches ({}):", branches.len());
    for branch in branches {
      println!("    {}", format_branch(&branch));
    }
  }

  Ok(())
}
