//! Core offload pipeline
//!
//! Everything between the command line and the filesystem: volume
//! discovery, cataloging, duplicate resolution, chunked copying, sidecar
//! emission, and the session state machine that sequences them.

pub mod catalog;
pub mod classify;
pub mod config;
pub mod copier;
pub mod dedup;
pub mod error;
pub mod session;
pub mod sidecar;
pub mod volume;
