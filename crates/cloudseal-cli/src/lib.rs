//! Cloudseal command-line tool
//!
//! Thin wrapper over `cloudseal-metadata` that reads and writes JSON files,
//! mostly useful for interop testing against other clients' documents.

pub mod commands;
pub mod config;

pub use config::CliConfig;
