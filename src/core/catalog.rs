//! Catalog builder
//!
//! Recursively walks a volume's DCIM tree and groups what it finds by
//! normalized base name: underscores stripped (Nikon pads names with
//! them), key uppercased so a raw+jpeg pair from the same shot lands in
//! one entry regardless of filesystem case. Downstream sidecar
//! generation is keyed by that base name, not by individual file.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::SystemTime;

use log::{debug, warn};
use walkdir::WalkDir;

use crate::core::classify::{self, Category};
use crate::core::config::ExtensionsConfig;
use crate::core::error::{OffloadError, Result};
use crate::core::volume::Volume;
use crate::platform::PlatformOps;

/// One media file discovered on a source volume
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path on the source volume
    pub path: PathBuf,
    /// Extension with its original case
    pub extension: String,
    pub category: Category,
    /// Byte size at catalog time
    pub size: u64,
    pub modified: Option<SystemTime>,
    /// Camera write-protect marker was set on the source
    pub locked: bool,
}

/// All files sharing one normalized base name (e.g. a raw+jpeg pair)
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Destination base name: underscores stripped, source case preserved
    pub base: String,
    pub files: Vec<SourceFile>,
}

impl CatalogEntry {
    fn contains_extension(&self, extension: &str) -> bool {
        self.files
            .iter()
            .any(|f| f.extension.eq_ignore_ascii_case(extension))
    }
}

/// Catalog of everything to transfer, aggregated across volumes.
///
/// Built once per session, immutable after the scan phase.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Entries keyed by uppercased normalized base name
    pub entries: BTreeMap<String, CatalogEntry>,
    pub total_files: usize,
    pub total_bytes: u64,
    pub locked_files: usize,
    /// Per-extension file counts (uppercase keys), for the scan summary
    pub type_counts: BTreeMap<String, usize>,
    /// A frame counter ends in 9xxx - warn before it wraps
    pub near_rollover: bool,
    /// A frame counter reads 9999 - names will collide soon
    pub rollover: bool,
    /// Directories that could not be read; recorded, never propagated
    pub unreadable: Vec<PathBuf>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scan one volume's DCIM tree into the catalog.
    ///
    /// With `locked_only` set, files without the write-protect marker are
    /// left out entirely. Two source files resolving to the same base name
    /// and extension are a fatal error - that only happens when folders or
    /// volumes collide, and silently picking one would lose data.
    pub fn scan_volume(
        &mut self,
        volume: &Volume,
        extensions: &ExtensionsConfig,
        platform: &dyn PlatformOps,
        locked_only: bool,
    ) -> Result<()> {
        debug!("Scanning {}", volume.dcim.display());

        // An unreadable DCIM root is fatal; unreadable subdirectories are
        // recorded and skipped further down.
        std::fs::read_dir(&volume.dcim).map_err(|e| OffloadError::ScanError {
            path: volume.dcim.clone(),
            message: e.to_string(),
        })?;

        for entry in WalkDir::new(&volume.dcim).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.to_path_buf())
                        .unwrap_or_else(|| volume.dcim.clone());
                    warn!("Skipping unreadable path {}: {}", path.display(), e);
                    self.unreadable.push(path);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some((stem, extension)) = classify::split_name(&file_name) else {
                continue;
            };
            let Some(category) = classify::classify(&file_name, extensions) else {
                continue;
            };

            let base = stem.replace('_', "");
            let key = base.to_uppercase();
            self.note_rollover(&key);

            let locked = platform.file_locked(entry.path()).unwrap_or(false);
            if locked_only && !locked {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Skipping {}: {}", entry.path().display(), e);
                    self.unreadable.push(entry.path().to_path_buf());
                    continue;
                }
            };

            let file = SourceFile {
                path: entry.path().to_path_buf(),
                extension: extension.to_string(),
                category,
                size: metadata.len(),
                modified: metadata.modified().ok(),
                locked,
            };

            let slot = self.entries.entry(key).or_insert_with(|| CatalogEntry {
                base: base.clone(),
                files: Vec::new(),
            });
            if slot.contains_extension(&file.extension) {
                return Err(OffloadError::SourceCollision(format!(
                    "{}.{}",
                    base, file.extension
                )));
            }

            self.total_files += 1;
            self.total_bytes += file.size;
            if locked {
                self.locked_files += 1;
            }
            *self
                .type_counts
                .entry(file.extension.to_uppercase())
                .or_insert(0) += 1;
            slot.files.push(file);
        }

        Ok(())
    }

    /// Track how close the camera's 4-digit frame counter is to wrapping
    fn note_rollover(&mut self, key: &str) {
        let digits: Vec<char> = key.chars().rev().take(4).collect();
        if digits.len() == 4 && digits.iter().all(|c| c.is_ascii_digit()) {
            if digits[3] == '9' {
                self.near_rollover = true;
            }
            if digits.iter().all(|&c| c == '9') {
                self.rollover = true;
            }
        }
    }
}
