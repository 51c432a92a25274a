//! # SonarQube API Client
//!
//! Web API integration for SonarQube and SonarCloud servers: listing the
//! branches of a project, validating credentials and reading the server
//! version. [`SonarClient`] is the [`ProjectBranchSource`] used by the branch
//! matcher.
//!
//! [`ProjectBranchSource`]: sqbranch_core::ProjectBranchSource

pub mod auth;
pub mod client;
pub mod consts;
pub mod endpoints;
pub mod models;
mod source;

pub use auth::{create_sonar_client, create_sonar_client_for_project};
pub use client::SonarClient;
pub use models::{ProjectBranch, SonarAuth};
