//! # Sonar API Endpoints
//!
//! Endpoint implementations grouped by web service.

pub mod branches;
pub mod system;
