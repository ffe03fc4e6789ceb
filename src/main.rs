//! Binary entry point
//!
//! Wires up logging, configuration, and the Ctrl-C handler, then hands
//! off to the command layer. The first Ctrl-C sets the interruption flag
//! and lets the copy loop stop at a chunk boundary; a second one exits
//! immediately.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;

use dcim_offload::cli::args::Args;
use dcim_offload::cli::commands;
use dcim_offload::core::config::Config;

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(commands::EXIT_FATAL);
        }
    };

    init_logging(&args, &config);

    if args.init_config {
        return match Config::init_default_file() {
            Ok(path) => {
                println!("Wrote default configuration to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(commands::EXIT_FATAL)
            }
        };
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            eprintln!("\nForced exit.");
            std::process::exit(130);
        }
        eprintln!("\nInterrupt requested; stopping at the next chunk boundary...");
    }) {
        eprintln!("Warning: could not install the Ctrl-C handler: {}", e);
    }

    ExitCode::from(commands::run(args, config, interrupt))
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config file {}", path.display())),
        None => Config::load_default().context("loading configuration"),
    }
}

/// Level comes from --log-level, falling back to the config file
fn init_logging(args: &Args, config: &Config) {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.logging.level)
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::Info);
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_secs()
        .init();
}
