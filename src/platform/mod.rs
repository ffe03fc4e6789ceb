//! Platform capability layer
//!
//! All platform-specific branching lives behind the [`PlatformOps`] trait:
//! write-protect flags, volume eject, keep-awake holds, and the default
//! locations where removable volumes appear. One implementation per target
//! platform is selected at startup by [`default_ops`]; the pipeline itself
//! never touches a `cfg` attribute.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Child;

use log::{debug, warn};

use crate::core::volume::Volume;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(all(unix, not(target_os = "macos")))]
mod unix;
#[cfg(windows)]
mod windows;

/// Platform-specific operations needed by the offload pipeline
pub trait PlatformOps {
    /// Directories whose children are candidate volume roots
    fn volume_roots(&self) -> Vec<PathBuf>;

    /// Whether a file carries the camera write-protect marker
    /// (user-immutable flag on macOS, read-only attribute elsewhere)
    fn file_locked(&self, path: &Path) -> io::Result<bool>;

    /// Clear any write-protect marker so the file can be modified
    fn clear_write_protect(&self, path: &Path) -> io::Result<()>;

    /// Acquire a keep-awake hold for the duration of the session.
    /// Returns `None` where the platform needs no hold.
    fn acquire_keep_awake(&self) -> Option<KeepAwake>;

    /// Flush filesystem buffers so a yanked card or power failure cannot
    /// lose already-written destination data
    fn flush_buffers(&self) -> io::Result<()>;

    /// Unmount/eject a source volume
    fn eject(&self, volume: &Volume) -> io::Result<()>;
}

/// RAII guard for the keep-awake hold.
///
/// Acquired once at session start and released exactly once on every exit
/// path - normal completion, per-file failure, or interruption - by Drop.
pub struct KeepAwake {
    child: Option<Child>,
}

impl KeepAwake {
    pub fn from_child(child: Child) -> Self {
        Self { child: Some(child) }
    }
}

impl Drop for KeepAwake {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!("Releasing keep-awake hold");
            if let Err(e) = child.kill() {
                warn!("Failed to stop keep-awake process: {}", e);
            }
            let _ = child.wait();
        }
    }
}

/// Select the implementation for the current target platform
pub fn default_ops() -> Box<dyn PlatformOps> {
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::MacPlatform)
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        Box::new(unix::UnixPlatform)
    }
    #[cfg(windows)]
    {
        Box::new(windows::WindowsPlatform)
    }
}
