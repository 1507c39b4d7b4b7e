//! CLI command implementations

pub mod asset;
pub mod case;
pub mod completions;
pub mod init;
