//! Git access for branch matching.
//!
//! [`detection`] finds the working copy that contains a path, [`reader`]
//! exposes the narrow read-only view of a repository that the matcher
//! consumes, and [`locator`] ties the two together for the server branch
//! provider.

pub mod detection;
pub mod locator;
pub mod reader;

pub use detection::{detect_repository_from_path, resolve_repository_root};
pub use locator::{RepositoryLocator, WorkingDirLocator};
pub use reader::{CommitIter, Git2Reader, GitReader};
