//! # sqbranch Core Library
//!
//! Branch matching between a local git working copy and the branches known by
//! a SonarQube or SonarCloud project, together with the binding, configuration
//! and credential plumbing the matcher needs.
//!
//! The entry point for consumers is
//! [`StatefulServerBranchProvider::get_server_branch_name`], which memoises the
//! result of [`ServerBranchProvider`] for the lifetime of a binding session.

pub mod binding;
pub mod branch;
pub mod config;
pub mod creds;
pub mod git;

pub use binding::{BindingConfiguration, BindingEvent, BindingSubscription, BindingTracker, BoundProject};
pub use branch::{
  BindingSource, BranchMatchError, BranchMatcher, BranchType, CommitId, Distance, ProjectBranchSource,
  ProviderLifecycle, RemoteBranch, RepositoryChanged, ServerBranchLookup, ServerBranchProvider,
  StatefulServerBranchProvider, compute_distance,
};
pub use config::{ConfigDirs, Settings, get_config_dirs};
pub use creds::{Credentials, resolve_credentials};
pub use git::{Git2Reader, GitReader, RepositoryLocator, WorkingDirLocator};
