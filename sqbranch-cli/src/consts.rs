//! Constants for the sqbranch CLI

/// Default time allowed for resolving the server branch, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Example `.netrc` entry shown by `creds check`
pub const NETRC_EXAMPLE: &str = "machine sonarcloud.io\n  login <your-user-token>";
