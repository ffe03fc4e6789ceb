//! dcim-offload: camera media offload pipeline
//!
//! Scans mounted volumes for DCIM trees, catalogs media by normalized
//! base name, and copies everything not already present into a dated
//! directory inside each destination. Duplicate detection is name plus
//! exact byte size, which makes re-runs after interruption idempotent:
//! a partial file shows up as a size mismatch and is copied again.
//!
//! The library is split into three layers:
//! - [`core`]: the pipeline itself (catalog, dedup, copier, session)
//! - [`platform`]: OS-specific concerns behind the `PlatformOps` trait
//! - [`cli`]: argument parsing, dispatch, and the progress display

pub mod cli;
pub mod core;
pub mod platform;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");
