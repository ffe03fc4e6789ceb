//! Duplicate resolver
//!
//! Decides, immediately before each copy, whether the destination already
//! holds this file. The rule is name + exact byte size - no content
//! hashing. That is a deliberate speed tradeoff for large card transfers:
//! a same-size corrupt copy goes undetected, but a partial copy from an
//! interrupted run always shows up as a size mismatch and is redone.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::catalog::{CatalogEntry, SourceFile};

/// Outcome of duplicate resolution for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyDecision {
    /// Same name, same size - skip
    Duplicate,
    /// Missing or size mismatch - copy (overwriting any stale file)
    NeedsCopy,
}

/// Destination path for a catalog member: normalized base, original extension
pub fn dest_path(entry: &CatalogEntry, file: &SourceFile, dest_dir: &Path) -> PathBuf {
    dest_dir.join(format!("{}.{}", entry.base, file.extension))
}

/// Compare one source file against the current destination state
pub fn resolve(file: &SourceFile, dest: &Path) -> CopyDecision {
    match fs::metadata(dest) {
        Ok(meta) if meta.is_file() && meta.len() == file.size => CopyDecision::Duplicate,
        _ => CopyDecision::NeedsCopy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::Category;
    use tempfile::TempDir;

    fn source_file(dir: &Path, name: &str, len: usize) -> SourceFile {
        let path = dir.join(name);
        fs::write(&path, vec![1u8; len]).unwrap();
        SourceFile {
            path,
            extension: "JPG".to_string(),
            category: Category::Jpeg,
            size: len as u64,
            modified: None,
            locked: false,
        }
    }

    #[test]
    fn test_same_size_is_duplicate() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let file = source_file(src.path(), "DSC0001.JPG", 64);
        let dest = dst.path().join("DSC0001.JPG");
        fs::write(&dest, vec![2u8; 64]).unwrap();

        assert_eq!(resolve(&file, &dest), CopyDecision::Duplicate);
    }

    #[test]
    fn test_size_mismatch_needs_copy() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let file = source_file(src.path(), "DSC0001.JPG", 64);
        let dest = dst.path().join("DSC0001.JPG");
        // Simulates a partial copy left by an interrupted run
        fs::write(&dest, vec![2u8; 32]).unwrap();

        assert_eq!(resolve(&file, &dest), CopyDecision::NeedsCopy);
    }

    #[test]
    fn test_missing_destination_needs_copy() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let file = source_file(src.path(), "DSC0001.JPG", 64);

        assert_eq!(
            resolve(&file, &dst.path().join("DSC0001.JPG")),
            CopyDecision::NeedsCopy
        );
    }

    #[test]
    fn test_dest_path_uses_normalized_base_and_source_extension() {
        let src = TempDir::new().unwrap();
        let file = source_file(src.path(), "DSC_0001.JPG", 8);
        let entry = CatalogEntry {
            base: "DSC0001".to_string(),
            files: vec![file.clone()],
        };
        let dest = dest_path(&entry, &file, Path::new("/out"));
        assert_eq!(dest, Path::new("/out/DSC0001.JPG"));
    }
}
