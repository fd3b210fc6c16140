//! Application identity from Cargo.toml, used for config paths and CLI output.

/// Application name (from Cargo.toml `package.name`).
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Application version (from Cargo.toml `package.version`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Vendor used for the platform project directories.
pub const VENDOR: &str = "polymorphl";
