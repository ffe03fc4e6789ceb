//! Command-line surface: argument parsing, dispatch, progress display

pub mod args;
pub mod commands;
pub mod progress;
