//! Command dispatch and exit-code mapping

use std::path::Path;
use std::process::Command;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{info, warn};

use crate::cli::args::Args;
use crate::cli::progress::{format_bytes, ConsoleProgress};
use crate::core::config::Config;
use crate::core::error::OffloadError;
use crate::core::session::{Session, SessionOptions, SessionResult};
use crate::core::sidecar::XmpEmitter;
use crate::platform;

pub const EXIT_SUCCESS: u8 = 0;
/// Setup failure or interruption
pub const EXIT_FATAL: u8 = 1;
pub const EXIT_NO_VOLUMES: u8 = 2;
/// Session completed but some files failed
pub const EXIT_FILE_FAILURES: u8 = 3;

/// Run one offload session and map the outcome to a process exit code
pub fn run(args: Args, config: Config, interrupt: Arc<AtomicBool>) -> u8 {
    let platform = platform::default_ops();

    let mut options = SessionOptions::from_config(args.destinations.clone(), &config);
    options.tag = args.tag.clone();
    options.description = args.description.clone();
    options.locked_only = args.locked_only;
    options.eject = args.eject;

    let sidecars = XmpEmitter;
    let session = Session::new(options, platform.as_ref(), &sidecars, interrupt);
    let mut progress = ConsoleProgress::new();
    let outcome = session.run(&mut progress);
    progress.finish();

    match outcome {
        Ok(result) => {
            print_summary(&result);
            if !result.interrupted {
                run_integrations(&args, &config, &result);
            }
            if result.interrupted {
                EXIT_FATAL
            } else if result.failures() > 0 {
                EXIT_FILE_FAILURES
            } else {
                EXIT_SUCCESS
            }
        }
        Err(OffloadError::NoVolumesFound) => {
            eprintln!("No DCIM volume is mounted. Insert a card and try again.");
            EXIT_NO_VOLUMES
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FATAL
        }
    }
}

fn print_summary(result: &SessionResult) {
    println!(
        "Copied {} files ({}), skipped {} already present.",
        result.copied(),
        format_bytes(result.progress.bytes_copied),
        result.skipped()
    );
    for dest in &result.destinations {
        if dest.failed > 0 {
            println!(
                "{} files failed for {}; see the log above.",
                dest.failed,
                dest.directory.display()
            );
        }
    }
    if result.sidecar_failures > 0 {
        println!("{} sidecar files could not be written.", result.sidecar_failures);
    }
    if result.interrupted {
        println!("Interrupted. Re-running will finish only what is missing.");
    }
}

/// Post-session launchers. They act on the first destination's dated
/// directory and never affect the exit code.
fn run_integrations(args: &Args, config: &Config, result: &SessionResult) {
    let Some(first) = result.destinations.first() else {
        return;
    };
    let dir = &first.directory;

    if args.automate {
        launch_editor(&config.integration.editor_app, dir);
    }
    if args.resolve {
        run_importer(&config.integration.importer_command, dir);
    }
}

fn launch_editor(editor_app: &str, dir: &Path) {
    let opened = if editor_app.is_empty() {
        open::that(dir)
    } else {
        open::with(dir, editor_app)
    };
    match opened {
        Ok(()) => info!("Opened {} in the editor", dir.display()),
        Err(e) => warn!("Could not open {}: {}", dir.display(), e),
    }
}

fn run_importer(importer_command: &str, dir: &Path) {
    let mut parts = importer_command.split_whitespace();
    let Some(program) = parts.next() else {
        warn!("No importer_command configured; skipping media-pool import");
        return;
    };
    let status = Command::new(program).args(parts).arg(dir).status();
    match status {
        Ok(status) if status.success() => info!("Imported {} into the media pool", dir.display()),
        Ok(status) => warn!("Importer exited with {}", status),
        Err(e) => warn!("Could not run importer '{}': {}", program, e),
    }
}
