//! Test utilities shared across the sqbranch workspace
//!
//! This crate provides common testing infrastructure including:
//! - temporary git repositories with branch helpers ([`GitRepoTestGuard`])
//! - XDG directory isolation ([`EnvTestGuard`])
//! - HOME and `.netrc` isolation ([`NetrcGuard`])
//!
//! The dead_code lint is disabled for this crate because not every test uses
//! every helper, and usage across development dependencies is invisible to
//! the compiler.

#![allow(dead_code)]

pub mod env;
pub mod git;
pub mod netrc;

pub use env::EnvTestGuard;
pub use git::GitRepoTestGuard;
pub use netrc::NetrcGuard;
