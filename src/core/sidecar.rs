//! XMP sidecar emitter
//!
//! Called once per copied still image, after the image bytes are fully
//! written. The sidecar is named after the entry's normalized base name,
//! so a raw+jpeg pair shares one `<base>.xmp`. A failure here is logged
//! against the file and never rolls back the copy.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Emits a metadata sidecar next to a copied image
pub trait SidecarEmitter {
    /// Write the sidecar for `base` into `dest_dir`.
    ///
    /// `locked` carries the camera write-protect state of the source so
    /// the editor can surface protected shots. Returns the path written.
    fn emit(
        &self,
        dest_dir: &Path,
        base: &str,
        description: Option<&str>,
        locked: bool,
    ) -> io::Result<PathBuf>;
}

/// The default emitter: Adobe-flavored XMP with an optional description
/// and a Purple label for write-protected shots
pub struct XmpEmitter;

impl SidecarEmitter for XmpEmitter {
    fn emit(
        &self,
        dest_dir: &Path,
        base: &str,
        description: Option<&str>,
        locked: bool,
    ) -> io::Result<PathBuf> {
        let path = dest_dir.join(format!("{}.xmp", base));
        fs::write(&path, format_xmp(description, locked))?;
        Ok(path)
    }
}

/// Render the sidecar body. Pure formatting, no filesystem access.
pub fn format_xmp(description: Option<&str>, locked: bool) -> String {
    let label = if locked {
        "     xmp:Label=\"Purple\"\n"
    } else {
        ""
    };
    let description = description.unwrap_or("");
    format!(
        "<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">\n\
         <rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n\
         \n\
         \x20 <rdf:Description rdf:about=\"\"\n\
         \x20    xmlns:xmp=\"http://ns.adobe.com/xap/1.0/\"\n\
         \x20    xmlns:dc=\"http://purl.org/dc/elements/1.1/\"\n\
         {label}\x20    >\n\
         \x20    <dc:description>\n\
         \x20     <rdf:Alt>\n\
         \x20       <rdf:li xml:lang=\"x-default\">{description}&#xA;</rdf:li>\n\
         \x20     </rdf:Alt>\n\
         \x20   </dc:description>\n\
         \x20 </rdf:Description>\n\
         \n\
         </rdf:RDF>\n\
         </x:xmpmeta>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_description_is_embedded() {
        let xmp = format_xmp(Some("Lake Superior, morning"), false);
        assert!(xmp.contains("Lake Superior, morning&#xA;"));
        assert!(!xmp.contains("xmp:Label"));
    }

    #[test]
    fn test_locked_source_gets_purple_label() {
        let xmp = format_xmp(None, true);
        assert!(xmp.contains("xmp:Label=\"Purple\""));
    }

    #[test]
    fn test_missing_description_renders_empty() {
        let xmp = format_xmp(None, false);
        assert!(xmp.contains("<rdf:li xml:lang=\"x-default\">&#xA;</rdf:li>"));
    }

    #[test]
    fn test_emitter_writes_base_named_file() {
        let dir = TempDir::new().unwrap();
        let path = XmpEmitter
            .emit(dir.path(), "DSC0001", Some("test"), false)
            .unwrap();
        assert_eq!(path, dir.path().join("DSC0001.xmp"));
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("<x:xmpmeta"));
        assert!(body.ends_with("</x:xmpmeta>\n"));
    }
}
