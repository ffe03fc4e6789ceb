//! End-to-end pipeline tests against real temp directories.
//!
//! Each test builds a fake card (a directory tree with a DCIM folder)
//! under a search root, runs a session against it, and inspects the
//! destination. Platform specifics are stubbed with a test implementation
//! that models write protection as the read-only permission bit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use dcim_offload::core::config::ExtensionsConfig;
use dcim_offload::core::error::OffloadError;
use dcim_offload::core::session::{
    NullObserver, ProgressObserver, Session, SessionOptions,
};
use dcim_offload::core::sidecar::XmpEmitter;
use dcim_offload::core::volume::Volume;
use dcim_offload::platform::{KeepAwake, PlatformOps};

struct TestPlatform;

impl PlatformOps for TestPlatform {
    fn volume_roots(&self) -> Vec<PathBuf> {
        Vec::new()
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
    fn eject(&self, _volume: &Volume) -> io::Result<()> {
        Ok(())
    }
}

/// Captures observer callbacks for assertions
#[derive(Default)]
struct RecordingObserver {
    planned_bytes: u64,
    planned_files: usize,
    last_cumulative: u64,
    files: Vec<String>,
}

impl ProgressObserver for RecordingObserver {
    fn planned(&mut self, total_bytes: u64, total_files: usize) {
        self.planned_bytes = total_bytes;
        self.planned_files = total_files;
    }
    fn bytes_copied(&mut self, cumulative: u64) {
        assert!(cumulative >= self.last_cumulative, "progress went backwards");
        self.last_cumulative = cumulative;
    }
    fn file_started(&mut self, name: &str) {
        self.files.push(name.to_string());
    }
}

fn write_file(path: &Path, len: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![0x5Au8; len]).unwrap();
}

fn lock_file(path: &Path) {
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_readonly(true);
    fs::set_permissions(path, perms).unwrap();
}

/// A search root containing one card named CARD1 with a DCIM tree
fn make_card(root: &Path) -> PathBuf {
    let shots = root.join("CARD1/DCIM/100NIKON");
    fs::create_dir_all(&shots).unwrap();
    shots
}

fn options(root: &Path, dest: &Path) -> SessionOptions {
    SessionOptions {
        destinations: vec![dest.to_path_buf()],
        tag: "Test Shoot".to_string(),
        description: None,
        locked_only: false,
        eject: false,
        chunk_size: 16,
        search_roots: vec![root.to_path_buf()],
        extensions: ExtensionsConfig::default(),
    }
}

fn run_session(
    opts: SessionOptions,
    observer: &mut dyn ProgressObserver,
) -> dcim_offload::core::error::Result<dcim_offload::core::session::SessionResult> {
    let interrupt = Arc::new(AtomicBool::new(false));
    Session::new(opts, &TestPlatform, &XmpEmitter, interrupt).run(observer)
}

/// The single dated directory a session created inside a destination
fn dated_dir(dest: &Path) -> PathBuf {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dest)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect();
    assert_eq!(dirs.len(), 1, "expected exactly one dated directory");
    dirs.pop().unwrap()
}

#[test]
fn test_pair_offload_with_sidecars() {
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let shots = make_card(root.path());
    write_file(&shots.join("DSC_0001.NEF"), 200);
    write_file(&shots.join("DSC_0001.JPG"), 50);
    write_file(&shots.join("DSC_0002.MOV"), 90);

    let result = run_session(options(root.path(), dest.path()), &mut NullObserver).unwrap();

    assert_eq!(result.copied(), 3);
    assert_eq!(result.skipped(), 0);
    assert_eq!(result.failures(), 0);
    assert!(!result.interrupted);
    assert!(result.dir_name.ends_with("Test Shoot"));

    let dir = dated_dir(dest.path());
    assert_eq!(fs::metadata(dir.join("DSC0001.NEF")).unwrap().len(), 200);
    assert_eq!(fs::metadata(dir.join("DSC0001.JPG")).unwrap().len(), 50);
    assert_eq!(fs::metadata(dir.join("DSC0002.MOV")).unwrap().len(), 90);
    // Stills share one sidecar per base name; clips get none
    assert!(dir.join("DSC0001.xmp").exists());
    assert!(!dir.join("DSC0002.xmp").exists());
}

#[test]
fn test_second_run_is_idempotent() {
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let shots = make_card(root.path());
    write_file(&shots.join("DSC_0001.JPG"), 64);
    write_file(&shots.join("DSC_0002.JPG"), 64);

    let first = run_session(options(root.path(), dest.path()), &mut NullObserver).unwrap();
    assert_eq!(first.copied(), 2);

    let second = run_session(options(root.path(), dest.path()), &mut NullObserver).unwrap();
    assert_eq!(second.copied(), 0);
    assert_eq!(second.skipped(), 2);
}

#[test]
fn test_size_mismatch_is_copied_again() {
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let shots = make_card(root.path());
    write_file(&shots.join("DSC_0001.JPG"), 64);

    run_session(options(root.path(), dest.path()), &mut NullObserver).unwrap();
    let copy = dated_dir(dest.path()).join("DSC0001.JPG");

    // Truncate the copy the way an interrupted run would leave it
    fs::write(&copy, vec![0u8; 10]).unwrap();

    let again = run_session(options(root.path(), dest.path()), &mut NullObserver).unwrap();
    assert_eq!(again.copied(), 1);
    assert_eq!(fs::metadata(&copy).unwrap().len(), 64);
}

#[test]
fn test_progress_totals_match_copied_bytes() {
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let shots = make_card(root.path());
    write_file(&shots.join("DSC_0001.NEF"), 300);
    write_file(&shots.join("DSC_0002.JPG"), 44);

    let mut observer = RecordingObserver::default();
    let result = run_session(options(root.path(), dest.path()), &mut observer).unwrap();

    assert_eq!(observer.planned_bytes, 344);
    assert_eq!(observer.planned_files, 2);
    assert_eq!(observer.last_cumulative, 344);
    assert_eq!(result.progress.bytes_copied, 344);
    assert_eq!(result.progress.files_copied, 2);
    assert_eq!(observer.files.len(), 2);
}

#[test]
fn test_no_volumes_is_an_error() {
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    // Search root exists but holds nothing with a DCIM tree
    fs::create_dir_all(root.path().join("EMPTYCARD")).unwrap();

    let err = run_session(options(root.path(), dest.path()), &mut NullObserver).unwrap_err();
    assert!(matches!(err, OffloadError::NoVolumesFound));
}

#[test]
fn test_missing_destination_is_rejected() {
    let root = TempDir::new().unwrap();
    let shots = make_card(root.path());
    write_file(&shots.join("DSC_0001.JPG"), 8);

    let missing = root.path().join("no-such-destination");
    let err = run_session(options(root.path(), &missing), &mut NullObserver).unwrap_err();
    assert!(matches!(err, OffloadError::DestinationUnwritable(_)));
}

#[test]
fn test_locked_only_offloads_only_protected_shots() {
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let shots = make_card(root.path());
    write_file(&shots.join("DSC_0001.JPG"), 32);
    write_file(&shots.join("DSC_0002.JPG"), 32);
    lock_file(&shots.join("DSC_0002.JPG"));

    let mut opts = options(root.path(), dest.path());
    opts.locked_only = true;
    let result = run_session(opts, &mut NullObserver).unwrap();

    assert_eq!(result.copied(), 1);
    let dir = dated_dir(dest.path());
    assert!(!dir.join("DSC0001.JPG").exists());
    assert!(dir.join("DSC0002.JPG").exists());
    // The copy must be editable even though the source was protected
    assert!(!fs::metadata(dir.join("DSC0002.JPG"))
        .unwrap()
        .permissions()
        .readonly());
}

#[test]
fn test_locked_source_marks_sidecar_purple() {
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let shots = make_card(root.path());
    write_file(&shots.join("DSC_0001.JPG"), 32);
    lock_file(&shots.join("DSC_0001.JPG"));

    run_session(options(root.path(), dest.path()), &mut NullObserver).unwrap();

    let xmp = fs::read_to_string(dated_dir(dest.path()).join("DSC0001.xmp")).unwrap();
    assert!(xmp.contains("xmp:Label=\"Purple\""));
}

#[test]
fn test_description_reaches_the_sidecar() {
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let shots = make_card(root.path());
    write_file(&shots.join("DSC_0001.JPG"), 32);

    let mut opts = options(root.path(), dest.path());
    opts.description = Some("Harbor at dusk".to_string());
    run_session(opts, &mut NullObserver).unwrap();

    let xmp = fs::read_to_string(dated_dir(dest.path()).join("DSC0001.xmp")).unwrap();
    assert!(xmp.contains("Harbor at dusk"));
}

#[test]
fn test_every_destination_receives_a_full_copy() {
    let root = TempDir::new().unwrap();
    let dest_a = TempDir::new().unwrap();
    let dest_b = TempDir::new().unwrap();
    let shots = make_card(root.path());
    write_file(&shots.join("DSC_0001.JPG"), 64);

    let mut opts = options(root.path(), dest_a.path());
    opts.destinations.push(dest_b.path().to_path_buf());
    let mut observer = RecordingObserver::default();
    let result = run_session(opts, &mut observer).unwrap();

    assert_eq!(result.copied(), 2);
    assert_eq!(observer.planned_bytes, 128);
    assert!(dated_dir(dest_a.path()).join("DSC0001.JPG").exists());
    assert!(dated_dir(dest_b.path()).join("DSC0001.JPG").exists());
}

/// Observer that trips the interruption flag partway through the transfer
struct InterruptingObserver {
    interrupt: Arc<AtomicBool>,
    trip_at: u64,
}

impl ProgressObserver for InterruptingObserver {
    fn bytes_copied(&mut self, cumulative: u64) {
        if cumulative >= self.trip_at {
            self.interrupt.store(true, Ordering::SeqCst);
        }
    }
}

#[test]
fn test_interruption_stops_cleanly_and_rerun_finishes() {
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let shots = make_card(root.path());
    write_file(&shots.join("DSC_0001.JPG"), 64);
    write_file(&shots.join("DSC_0002.JPG"), 64);

    let interrupt = Arc::new(AtomicBool::new(false));
    let mut observer = InterruptingObserver {
        interrupt: interrupt.clone(),
        trip_at: 32,
    };
    let opts = options(root.path(), dest.path());
    let result = Session::new(opts, &TestPlatform, &XmpEmitter, interrupt)
        .run(&mut observer)
        .unwrap();

    assert!(result.interrupted);
    assert!(result.copied() < 2);

    // The partial file shows up as a size mismatch and is finished now
    let rerun = run_session(options(root.path(), dest.path()), &mut NullObserver).unwrap();
    assert!(!rerun.interrupted);
    assert_eq!(rerun.copied() + rerun.skipped(), 2);

    let dir = dated_dir(dest.path());
    assert_eq!(fs::metadata(dir.join("DSC0001.JPG")).unwrap().len(), 64);
    assert_eq!(fs::metadata(dir.join("DSC0002.JPG")).unwrap().len(), 64);
}

#[test]
fn test_source_collision_aborts_before_copying() {
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    make_card(root.path());
    let card = root.path().join("CARD1/DCIM");
    write_file(&card.join("100NIKON/DSC_0001.JPG"), 10);
    write_file(&card.join("101NIKON/DSC_0001.JPG"), 12);

    let err = run_session(options(root.path(), dest.path()), &mut NullObserver).unwrap_err();
    assert!(matches!(err, OffloadError::SourceCollision(_)));
    // Nothing was copied
    assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
}
