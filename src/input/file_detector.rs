//! Media type detection

use crate::input::document::MediaType;
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Guess the media type of a file from its extension, falling back to the
/// PDF magic bytes when the extension is missing or unknown.
pub fn detect_media_type(path: &Path, bytes: &[u8]) -> Option<MediaType> {
    let from_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(MediaType::from_extension);

    from_extension.or_else(|| {
        if bytes.starts_with(PDF_MAGIC) {
            Some(MediaType::Pdf)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_wins() {
        let detected = detect_media_type(Path::new("cv.MD"), b"%PDF-1.7");
        assert_eq!(detected, Some(MediaType::Markdown));
    }

    #[test]
    fn test_magic_bytes_fallback() {
        assert_eq!(detect_media_type(Path::new("resume"), b"%PDF-1.4\n"), Some(MediaType::Pdf));
        assert_eq!(detect_media_type(Path::new("resume.docx"), b"PK\x03\x04"), None);
    }
}
