//! Extension classifier
//!
//! Maps a filename to a media category via case-insensitive extension
//! lookup against the configurable sets in [`ExtensionsConfig`].
//! Unknown extensions are silently ignored - they are neither cataloged
//! nor copied, and no error is raised.

use crate::core::config::ExtensionsConfig;

/// Media category of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Plain still image (JPEG and friends)
    Jpeg,
    /// Camera raw still image
    Raw,
    /// Motion clip
    Video,
}

impl Category {
    /// Still images of either kind get an XMP sidecar; video never does.
    pub fn wants_sidecar(self) -> bool {
        matches!(self, Category::Jpeg | Category::Raw)
    }
}

/// Split a filename into (stem, extension) at the last dot.
///
/// Returns `None` for hidden files (leading dot) and files without an
/// extension - cameras never produce either, so they are not media.
pub fn split_name(file_name: &str) -> Option<(&str, &str)> {
    if file_name.starts_with('.') {
        return None;
    }
    let dot = file_name.rfind('.')?;
    let (stem, ext) = (&file_name[..dot], &file_name[dot + 1..]);
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some((stem, ext))
}

/// Classify a filename, returning `None` when it should be ignored.
pub fn classify(file_name: &str, extensions: &ExtensionsConfig) -> Option<Category> {
    let (_, ext) = split_name(file_name)?;
    let ext_upper = ext.to_uppercase();
    let matches_set = |set: &[String]| set.iter().any(|e| e.to_uppercase() == ext_upper);

    if matches_set(&extensions.jpeg) {
        Some(Category::Jpeg)
    } else if matches_set(&extensions.raw) {
        Some(Category::Raw)
    } else if matches_set(&extensions.video) {
        Some(Category::Video)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        let exts = ExtensionsConfig::default();
        assert_eq!(classify("DSC_0001.JPG", &exts), Some(Category::Jpeg));
        assert_eq!(classify("DSC_0001.NEF", &exts), Some(Category::Raw));
        assert_eq!(classify("DSC_0002.MOV", &exts), Some(Category::Video));
        assert_eq!(classify("DSC_0002.MP4", &exts), Some(Category::Video));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let exts = ExtensionsConfig::default();
        assert_eq!(classify("dsc_0001.jpg", &exts), Some(Category::Jpeg));
        assert_eq!(classify("dsc_0001.nEf", &exts), Some(Category::Raw));
        assert_eq!(classify("clip.mov", &exts), Some(Category::Video));
    }

    #[test]
    fn test_unknown_extensions_are_ignored() {
        let exts = ExtensionsConfig::default();
        assert_eq!(classify("NIKON001.DSC", &exts), None);
        assert_eq!(classify("readme.txt", &exts), None);
        assert_eq!(classify("firmware.bin", &exts), None);
    }

    #[test]
    fn test_hidden_and_extensionless_files_are_ignored() {
        let exts = ExtensionsConfig::default();
        assert_eq!(classify(".DS_Store", &exts), None);
        assert_eq!(classify("._DSC_0001.JPG", &exts), None);
        assert_eq!(classify("MISC", &exts), None);
        assert_eq!(classify("trailingdot.", &exts), None);
    }

    #[test]
    fn test_split_name_uses_last_dot() {
        assert_eq!(split_name("DSC_0001.backup.JPG"), Some(("DSC_0001.backup", "JPG")));
    }

    #[test]
    fn test_sidecar_scoping() {
        assert!(Category::Jpeg.wants_sidecar());
        assert!(Category::Raw.wants_sidecar());
        assert!(!Category::Video.wants_sidecar());
    }
}
