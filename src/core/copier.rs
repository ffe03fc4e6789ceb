//! Chunked copier
//!
//! Transfers one file in bounded chunks so progress is sub-file and an
//! interruption signal is observed at least once per chunk. After the
//! bytes land, modification and access timestamps are copied from the
//! source. Write-protect markers: the source's is read but never touched;
//! a stale marker on the destination (left by a prior locked copy) is
//! cleared before the new write, since the copy must stay editable.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use crate::core::catalog::SourceFile;
use crate::core::error::{OffloadError, Result};
use crate::platform::PlatformOps;

/// A single planned transfer; exists only for the duration of one copy
#[derive(Debug)]
pub struct CopyTask<'a> {
    pub source: &'a SourceFile,
    pub dest: PathBuf,
}

/// Copy one file in chunks, reporting cumulative bytes via `on_chunk`.
///
/// On an I/O failure the partial destination file is removed - a suspect
/// file is worse than no file. On interruption the partial is left in
/// place; the next run's duplicate resolution sees the size mismatch and
/// redoes it.
pub fn copy_file(
    task: &CopyTask<'_>,
    chunk_size: usize,
    interrupt: &AtomicBool,
    platform: &dyn PlatformOps,
    mut on_chunk: impl FnMut(u64),
) -> Result<u64> {
    if interrupt.load(Ordering::SeqCst) {
        return Err(OffloadError::Interrupted);
    }

    // A prior locked copy leaves the destination write-protected
    if task.dest.exists() {
        if platform.file_locked(&task.dest).unwrap_or(false) {
            debug!("Clearing write protect on {}", task.dest.display());
            platform
                .clear_write_protect(&task.dest)
                .map_err(|e| copy_error(task, e))?;
        }
    }

    match copy_chunks(task, chunk_size, interrupt, &mut on_chunk) {
        Ok(bytes) => Ok(bytes),
        Err(OffloadError::Interrupted) => Err(OffloadError::Interrupted),
        Err(e) => {
            warn!(
                "Removing suspect destination file {} after error",
                task.dest.display()
            );
            if let Err(rm) = fs::remove_file(&task.dest) {
                debug!("Could not remove {}: {}", task.dest.display(), rm);
            }
            Err(e)
        }
    }
}

fn copy_chunks(
    task: &CopyTask<'_>,
    chunk_size: usize,
    interrupt: &AtomicBool,
    on_chunk: &mut impl FnMut(u64),
) -> Result<u64> {
    let mut src = File::open(&task.source.path).map_err(|e| copy_error(task, e))?;
    let mut dst = File::create(&task.dest).map_err(|e| copy_error(task, e))?;

    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut copied: u64 = 0;

    loop {
        let n = src.read(&mut buf).map_err(|e| copy_error(task, e))?;
        if n == 0 {
            break;
        }
        dst.write_all(&buf[..n]).map_err(|e| copy_error(task, e))?;
        copied += n as u64;
        on_chunk(copied);

        if interrupt.load(Ordering::SeqCst) {
            return Err(OffloadError::Interrupted);
        }
    }

    dst.flush().map_err(|e| copy_error(task, e))?;
    copy_times(&task.source.path, &dst).map_err(|e| copy_error(task, e))?;
    drop(dst);

    Ok(copied)
}

/// Copy modification and access timestamps from source to destination
fn copy_times(source: &Path, dest: &File) -> std::io::Result<()> {
    let meta = fs::metadata(source)?;
    let mut times = fs::FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    dest.set_times(times)
}

fn copy_error(task: &CopyTask<'_>, e: std::io::Error) -> OffloadError {
    let filename = task
        .source
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| task.source.path.display().to_string());
    OffloadError::CopyError {
        filename,
        message: e.to_string(),
    }
}
