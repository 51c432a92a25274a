//! Constants for the sqbranch-sonar client

/// Base URL of SonarCloud
pub const SONARCLOUD_URL: &str = "https://sonarcloud.io";

/// User-Agent header value for the Sonar API client
pub const USER_AGENT: &str = concat!("sqbranch/", env!("CARGO_PKG_VERSION"));

/// Accept header value for the Sonar API
pub const ACCEPT: &str = "application/json";
