//! Windows platform operations
//!
//! Cards appear as drive letters; camera write protect maps to the
//! read-only file attribute. Windows removable disks are assumed to be
//! configured for flush-on-write, so buffer flush and eject are no-ops
//! here - the user pulls the card after the summary prints.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::core::volume::Volume;

use super::{KeepAwake, PlatformOps};

pub struct WindowsPlatform;

impl PlatformOps for WindowsPlatform {
    fn volume_roots(&self) -> Vec<PathBuf> {
        ('A'..='Z')
            .map(|letter| PathBuf::from(format!("{}:\\", letter)))
            .filter(|root| root.exists())
            .collect()
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
        None
    }

    fn flush_buffers(&self) -> io::Result<()> {
        Ok(())
    }

    fn eject(&self, volume: &Volume) -> io::Result<()> {
        info!(
            "Eject is not automated on Windows; remove {} once the light stops blinking",
            volume.name
        );
        Ok(())
    }
}
