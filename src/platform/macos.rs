//! macOS platform operations
//!
//! Camera write protect shows up as the user-immutable flag (visible with
//! `ls -lhdO`). Keep-awake is a `caffeinate -i` child process, and eject
//! goes through `diskutil unmount`.

use std::fs;
use std::io;
use std::os::macos::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::core::volume::Volume;

use super::{KeepAwake, PlatformOps};

/// st_flags bit for the BSD user-immutable flag
const UF_IMMUTABLE: u32 = 0x0000_0002;

pub struct MacPlatform;

impl PlatformOps for MacPlatform {
    fn volume_roots(&self) -> Vec<PathBuf> {
        vec![PathBuf::from("/Volumes")]
    }

    fn file_locked(&self, path: &Path) -> io::Result<bool> {
        let meta = fs::metadata(path)?;
        Ok(meta.st_flags() & UF_IMMUTABLE != 0 || meta.permissions().readonly())
    }

    fn clear_write_protect(&self, path: &Path) -> io::Result<()> {
        let status = Command::new("chflags").arg("nouchg").arg(path).status()?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "chflags nouchg exited with {}",
                status
            )));
        }
        let meta = fs::metadata(path)?;
        if meta.permissions().readonly() {
            let mut perms = meta.permissions();
            #[allow(clippy::permissions_set_readonly_false)]
            perms.set_readonly(false);
            fs::set_permissions(path, perms)?;
        }
        Ok(())
    }

    fn acquire_keep_awake(&self) -> Option<KeepAwake> {
        match Command::new("caffeinate").arg("-i").spawn() {
            Ok(child) => {
                debug!("Keep-awake hold acquired (caffeinate pid {})", child.id());
                Some(KeepAwake::from_child(child))
            }
            Err(e) => {
                info!("Could not start caffeinate: {}", e);
                None
            }
        }
    }

    fn flush_buffers(&self) -> io::Result<()> {
        // Guards against external disks being disconnected or losing power.
        let status = Command::new("sync").status()?;
        if !status.success() {
            return Err(io::Error::other(format!("sync exited with {}", status)));
        }
        Ok(())
    }

    fn eject(&self, volume: &Volume) -> io::Result<()> {
        let status = Command::new("diskutil")
            .arg("unmount")
            .arg(&volume.root)
            .status()?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "diskutil unmount exited with {}",
                status
            )));
        }
        Ok(())
    }
}
