//! Volume locator
//!
//! Enumerates candidate mount points and keeps the ones that look like
//! camera storage: a DCIM directory (case-insensitive) at the top level.
//! Roots that error on access are skipped, not fatal - a half-mounted or
//! permission-denied volume just never becomes a source.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// A mounted storage volume holding a DCIM tree.
///
/// Discovered at session start and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Volume {
    /// Display name (the mount point's directory name)
    pub name: String,
    /// Mount point of the volume
    pub root: PathBuf,
    /// The DCIM directory inside it
    pub dcim: PathBuf,
}

/// Find the top-level DCIM directory of a candidate root, if any
fn find_dcim(root: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(root).ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if name.to_string_lossy().eq_ignore_ascii_case("DCIM")
            && entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
        {
            return Some(entry.path());
        }
    }
    None
}

fn volume_at(root: &Path) -> Option<Volume> {
    let dcim = find_dcim(root)?;
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    Some(Volume {
        name,
        root: root.to_path_buf(),
        dcim,
    })
}

/// Enumerate volumes under the given search roots.
///
/// A search root can itself be a volume (a drive letter on Windows) or a
/// directory of mount points (/Volumes on macOS). Order follows the
/// filesystem's enumeration order and is not guaranteed stable.
pub fn locate_volumes(search_roots: &[PathBuf]) -> Vec<Volume> {
    let mut volumes = Vec::new();

    for root in search_roots {
        if let Some(volume) = volume_at(root) {
            debug!("Found DCIM volume at {}", volume.root.display());
            volumes.push(volume);
            continue;
        }

        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping search root {}: {}", root.display(), e);
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            if let Some(volume) = volume_at(&entry.path()) {
                debug!("Found DCIM volume at {}", volume.root.display());
                volumes.push(volume);
            }
        }
    }

    volumes
}
