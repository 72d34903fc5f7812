//! Version information for flock.

/// The version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name and version, as printed in the startup banner.
pub const NAME_VERSION: &str = concat!("flock v", env!("CARGO_PKG_VERSION"));
