//! # sqbranch CLI Library
//!
//! Command definitions and handlers for the sqbranch command-line tool.

pub mod cli;
pub mod consts;
pub mod utils;
