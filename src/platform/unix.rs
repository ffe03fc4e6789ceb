//! Generic Unix platform operations
//!
//! Cards show up under /media or /run/media. There is no per-file
//! immutable flag exposed through std here, so write protect maps to the
//! read-only permission bit, which is also what cameras set on FAT-hosted
//! files mounted on Linux.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::volume::Volume;

use super::{KeepAwake, PlatformOps};

pub struct UnixPlatform;

impl PlatformOps for UnixPlatform {
    fn volume_roots(&self) -> Vec<PathBuf> {
        let mut roots = vec![PathBuf::from("/media"), PathBuf::from("/mnt")];
        if let Ok(user) = std::env::var("USER") {
            roots.insert(0, PathBuf::from("/run/media").join(&user));
            roots.insert(1, PathBuf::from("/media").join(&user));
        }
        roots
    }

    fn file_locked(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::metadata(path)?.permissions().readonly())
    }

    fn clear_write_protect(&self, path: &Path) -> io::Result<()> {
        let mut perms = fs::metadata(path)?.permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(path, perms)
    }

    fn acquire_keep_awake(&self) -> Option<KeepAwake> {
        // No portable inhibit mechanism worth shelling out for.
        None
    }

    fn flush_buffers(&self) -> io::Result<()> {
        let status = Command::new("sync").status()?;
        if !status.success() {
            return Err(io::Error::other(format!("sync exited with {}", status)));
        }
        Ok(())
    }

    fn eject(&self, volume: &Volume) -> io::Result<()> {
        let status = Command::new("umount").arg(&volume.root).status()?;
        if !status.success() {
            return Err(io::Error::other(format!("umount exited with {}", status)));
        }
        Ok(())
    }
}
