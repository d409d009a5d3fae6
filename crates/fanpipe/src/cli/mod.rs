//! Command implementations for the `fanpipe` binary.

pub mod config;
pub mod process;
