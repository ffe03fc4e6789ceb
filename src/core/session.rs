//! Session coordinator
//!
//! Drives one offload session through its phases:
//!
//! `Idle -> Scanning -> Cataloging -> Copying -> Finalizing -> Done`
//!
//! with `Interrupted` reachable from Scanning, Cataloging, and Copying.
//! The coordinator owns the progress state, the session result, and the
//! keep-awake guard; cleanup (buffer flush, keep-awake release) runs on
//! every exit path, while eject only runs on non-interrupted completion.
//!
//! Everything is single-threaded and synchronous: the copy loop yields to
//! the progress observer between chunks, and the interruption flag is
//! polled at least once per chunk. No locking is needed because there is
//! no concurrent writer.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use log::{debug, info, warn};

use crate::core::catalog::Catalog;
use crate::core::config::{Config, ExtensionsConfig};
use crate::core::copier::{self, CopyTask};
use crate::core::dedup::{self, CopyDecision};
use crate::core::error::{OffloadError, Result};
use crate::core::sidecar::SidecarEmitter;
use crate::core::volume::{self, Volume};
use crate::platform::PlatformOps;

/// What the caller asked this session to do
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Destination directories; each receives the full catalog
    pub destinations: Vec<PathBuf>,
    /// Tag used in the dated destination directory name
    pub tag: String,
    /// Description embedded in each image's sidecar
    pub description: Option<String>,
    /// Only offload files the camera marked write-protected
    pub locked_only: bool,
    /// Eject source volumes after a clean run
    pub eject: bool,
    /// Copy chunk size in bytes
    pub chunk_size: usize,
    /// Volume search roots; empty means the platform default
    pub search_roots: Vec<PathBuf>,
    /// Recognized media extensions per category
    pub extensions: ExtensionsConfig,
}

impl SessionOptions {
    pub fn from_config(destinations: Vec<PathBuf>, config: &Config) -> Self {
        Self {
            destinations,
            tag: "Downloaded Images".to_string(),
            description: None,
            locked_only: false,
            eject: false,
            chunk_size: config.copy.chunk_size,
            search_roots: config.volumes.search_roots.clone(),
            extensions: config.extensions.clone(),
        }
    }
}

/// Phases of the session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Scanning,
    Cataloging,
    Copying,
    Finalizing,
    Interrupted,
    Done,
}

/// Cumulative transfer progress across the whole session.
///
/// Single writer (the copy loop), read by the progress display between
/// chunks. Totals never decrease.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressState {
    pub bytes_copied: u64,
    pub files_copied: usize,
    pub total_bytes: u64,
    pub total_files: usize,
}

/// Observer hooks the display layer implements; all optional
pub trait ProgressObserver {
    /// Totals are known; copying is about to start
    fn planned(&mut self, _total_bytes: u64, _total_files: usize) {}
    /// Cumulative bytes after another chunk landed
    fn bytes_copied(&mut self, _cumulative: u64) {}
    /// A file is about to be copied
    fn file_started(&mut self, _name: &str) {}
}

/// Observer that ignores everything; used by tests and quiet mode
pub struct NullObserver;

impl ProgressObserver for NullObserver {}

/// Per-destination outcome counts
#[derive(Debug, Clone)]
pub struct DestinationResult {
    pub directory: PathBuf,
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Final outcome of a session, returned to the caller at Done
#[derive(Debug, Clone, Default)]
pub struct SessionResult {
    /// Name of the dated directory created inside each destination
    pub dir_name: String,
    pub destinations: Vec<DestinationResult>,
    pub sidecar_failures: usize,
    pub interrupted: bool,
    pub progress: ProgressState,
}

impl SessionResult {
    pub fn copied(&self) -> usize {
        self.destinations.iter().map(|d| d.copied).sum()
    }

    pub fn skipped(&self) -> usize {
        self.destinations.iter().map(|d| d.skipped).sum()
    }

    /// File-level failures, copy and sidecar alike
    pub fn failures(&self) -> usize {
        self.destinations.iter().map(|d| d.failed).sum::<usize>() + self.sidecar_failures
    }
}

fn advance(phase: &mut SessionPhase, next: SessionPhase) {
    debug!("Session phase: {:?} -> {:?}", phase, next);
    *phase = next;
}

/// One offload session.
///
/// Owns the interruption flag and the keep-awake handle for its lifetime;
/// both are scoped to `run`, not process globals.
pub struct Session<'a> {
    options: SessionOptions,
    platform: &'a dyn PlatformOps,
    sidecars: &'a dyn SidecarEmitter,
    interrupt: Arc<AtomicBool>,
}

impl<'a> Session<'a> {
    pub fn new(
        options: SessionOptions,
        platform: &'a dyn PlatformOps,
        sidecars: &'a dyn SidecarEmitter,
        interrupt: Arc<AtomicBool>,
    ) -> Self {
        Self {
            options,
            platform,
            sidecars,
            interrupt,
        }
    }

    /// Run the session to completion (or interruption) and return the
    /// accumulated result. Setup errors abort before Copying; per-file
    /// errors are recorded and never abort the loop.
    pub fn run(self, observer: &mut dyn ProgressObserver) -> Result<SessionResult> {
        let Session {
            options,
            platform,
            sidecars,
            interrupt,
        } = self;
        let mut phase = SessionPhase::Idle;
        let mut progress = ProgressState::default();

        // Setup checks before any resource is acquired. A missing
        // destination is most often a mistyped path; catching it here
        // keeps a tag or description from being taken for a destination.
        for dest in &options.destinations {
            if !dest.is_dir() {
                return Err(OffloadError::DestinationUnwritable(dest.clone()));
            }
        }

        // Released exactly once, on every exit path, when this binding
        // drops at the end of run() or at any early return.
        let keep_awake = platform.acquire_keep_awake();

        advance(&mut phase, SessionPhase::Scanning);
        let roots = if options.search_roots.is_empty() {
            platform.volume_roots()
        } else {
            options.search_roots.clone()
        };
        let volumes = volume::locate_volumes(&roots);
        if volumes.is_empty() {
            drop(keep_awake);
            return Err(OffloadError::NoVolumesFound);
        }
        for v in &volumes {
            info!("Source volume: {} ({})", v.name, v.root.display());
        }

        advance(&mut phase, SessionPhase::Cataloging);
        let mut catalog = Catalog::new();
        for v in &volumes {
            if interrupt.load(Ordering::SeqCst) {
                return finish(
                    platform,
                    keep_awake,
                    &mut phase,
                    SessionResult {
                        interrupted: true,
                        progress,
                        ..Default::default()
                    },
                    &volumes,
                    false,
                );
            }
            catalog.scan_volume(v, &options.extensions, platform, options.locked_only)?;
        }
        report_catalog(&catalog, &options);

        // Dated directory inside each requested destination, created if
        // absent, accepted silently when it already exists.
        let today = Local::now();
        let dir_name = format!(
            "{}-{} {}",
            today.format("%-m"),
            today.format("%-d"),
            options.tag
        );
        let mut dest_dirs = Vec::with_capacity(options.destinations.len());
        for dest in &options.destinations {
            let dir = dest.join(&dir_name);
            fs::create_dir_all(&dir)
                .map_err(|_| OffloadError::DestinationUnwritable(dest.clone()))?;
            dest_dirs.push(dir);
        }

        progress.total_files = catalog.total_files * dest_dirs.len();
        progress.total_bytes = catalog.total_bytes * dest_dirs.len() as u64;
        observer.planned(progress.total_bytes, progress.total_files);

        advance(&mut phase, SessionPhase::Copying);
        let mut result = SessionResult {
            dir_name,
            destinations: dest_dirs
                .iter()
                .map(|d| DestinationResult {
                    directory: d.clone(),
                    copied: 0,
                    skipped: 0,
                    failed: 0,
                })
                .collect(),
            ..Default::default()
        };

        'copying: for (dest_index, dest_dir) in dest_dirs.iter().enumerate() {
            for entry in catalog.entries.values() {
                let mut image_copied = false;
                for file in &entry.files {
                    if interrupt.load(Ordering::SeqCst) {
                        result.interrupted = true;
                        break 'copying;
                    }

                    // Resolution happens immediately before each copy so
                    // it sees the latest destination state.
                    let dest_path = dedup::dest_path(entry, file, dest_dir);
                    match dedup::resolve(file, &dest_path) {
                        CopyDecision::Duplicate => {
                            debug!("Duplicate, skipping {}", dest_path.display());
                            result.destinations[dest_index].skipped += 1;
                            continue;
                        }
                        CopyDecision::NeedsCopy => {}
                    }

                    let file_name = format!("{}.{}", entry.base, file.extension);
                    observer.file_started(&file_name);

                    let task = CopyTask {
                        source: file,
                        dest: dest_path,
                    };
                    let before = progress.bytes_copied;
                    let outcome = copier::copy_file(
                        &task,
                        options.chunk_size,
                        &interrupt,
                        platform,
                        |chunk_cumulative| {
                            progress.bytes_copied = before + chunk_cumulative;
                            observer.bytes_copied(progress.bytes_copied);
                        },
                    );

                    match outcome {
                        Ok(_) => {
                            progress.files_copied += 1;
                            result.destinations[dest_index].copied += 1;
                            if file.category.wants_sidecar() {
                                image_copied = true;
                            }
                        }
                        Err(OffloadError::Interrupted) => {
                            warn!("Interrupted while copying {}", file_name);
                            result.interrupted = true;
                            break 'copying;
                        }
                        Err(e) => {
                            warn!("{}", e);
                            result.destinations[dest_index].failed += 1;
                        }
                    }
                }

                // One sidecar per entry, shared by a raw+jpeg pair,
                // written only after the image bytes landed
                if image_copied {
                    let locked = entry.files.iter().any(|f| f.locked);
                    if let Err(e) = sidecars.emit(
                        dest_dir,
                        &entry.base,
                        options.description.as_deref(),
                        locked,
                    ) {
                        warn!("Sidecar failed for {}: {}", entry.base, e);
                        result.sidecar_failures += 1;
                    }
                }
            }
        }

        result.progress = progress;
        let eject = options.eject;
        finish(platform, keep_awake, &mut phase, result, &volumes, eject)
    }
}

/// Finalizing: flush buffers, optionally eject, release the keep-awake
/// hold. Runs for interrupted sessions too; eject is skipped there since
/// the copy set is incomplete.
fn finish(
    platform: &dyn PlatformOps,
    keep_awake: Option<crate::platform::KeepAwake>,
    phase: &mut SessionPhase,
    result: SessionResult,
    volumes: &[Volume],
    eject: bool,
) -> Result<SessionResult> {
    advance(phase, SessionPhase::Finalizing);

    if let Err(e) = platform.flush_buffers() {
        warn!("Buffer flush failed: {}", e);
    }

    if eject && !result.interrupted {
        for v in volumes {
            match platform.eject(v) {
                Ok(()) => info!("Ejected {}", v.name),
                Err(e) => warn!("Could not eject {}: {}", v.name, e),
            }
        }
    }

    drop(keep_awake);

    if result.interrupted {
        advance(phase, SessionPhase::Interrupted);
    } else {
        advance(phase, SessionPhase::Done);
    }
    Ok(result)
}

fn report_catalog(catalog: &Catalog, options: &SessionOptions) {
    for (ext, count) in &catalog.type_counts {
        info!("{} {} files found.", count, ext);
    }
    info!(
        "{} images (potentially in multiple files) to transfer, {:.2} GB total.",
        catalog.entries.len(),
        catalog.total_bytes as f64 / (1024.0 * 1024.0 * 1024.0)
    );
    if catalog.locked_files > 0 {
        info!("{} files are locked.", catalog.locked_files);
    } else if options.locked_only {
        warn!("Downloading locked files only, but no locked files found.");
    }
    if catalog.rollover {
        warn!("Image numbers rolled over!");
    } else if catalog.near_rollover {
        warn!("Image numbers are nearing the rollover point!");
    }
    for dir in &catalog.unreadable {
        warn!("Unreadable during scan: {}", dir.display());
    }
}
