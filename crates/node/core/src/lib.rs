//! Node infrastructure for the flock binary.
//!
//! - [`args`] - CLI argument structs
//! - [`config`] - Figment configuration loading
//! - [`logging`] - Logging initialization
//! - [`version`] - Version information

pub mod args;
pub mod config;
pub mod logging;
pub mod version;
