//! Uploaded-document representation and media-type filtering.
//!
//! The upload surface accepts exactly four media types; anything else is
//! rejected before the extraction pipeline ever sees it. A document is
//! ephemeral — raw bytes plus the type that decides which extraction branch
//! runs — and nothing here outlives one extract/analyze cycle.

use crate::error::AnalyzerError;
use std::path::Path;
use tracing::debug;

/// Media types accepted by the upload surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
    Pdf,
}

impl MediaType {
    /// Map a declared MIME-ish type string to a supported media type.
    ///
    /// `image/jpg` is not a registered MIME type but browsers and upload
    /// widgets emit it anyway, so it is accepted as JPEG.
    pub fn from_declared(declared: &str) -> Option<Self> {
        match declared.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(MediaType::Jpeg),
            "image/png" => Some(MediaType::Png),
            "application/pdf" => Some(MediaType::Pdf),
            _ => None,
        }
    }

    /// Map a file extension (without the dot, any case) to a media type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "png" => Some(MediaType::Png),
            "pdf" => Some(MediaType::Pdf),
            _ => None,
        }
    }

    /// True for the image branch of the extractor.
    pub fn is_image(self) -> bool {
        matches!(self, MediaType::Jpeg | MediaType::Png)
    }

    /// Canonical MIME string for this type.
    pub fn as_mime(self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Pdf => "application/pdf",
        }
    }
}

/// One uploaded medical report: raw bytes plus the declared media type.
///
/// Exists only for a single extract/analyze cycle; nothing is persisted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
}

impl UploadedDocument {
    /// Construct from raw bytes and a declared media type string.
    ///
    /// Rejects any type outside {jpeg, jpg, png, pdf} — the caller-visible
    /// equivalent of the upload widget's type allowlist.
    pub fn new(bytes: Vec<u8>, declared: &str) -> Result<Self, AnalyzerError> {
        let media_type = MediaType::from_declared(declared).ok_or_else(|| {
            AnalyzerError::UnsupportedMediaType {
                declared: declared.to_string(),
            }
        })?;
        Ok(Self { bytes, media_type })
    }

    /// Read a report from disk, inferring the media type from the extension.
    ///
    /// PDFs are additionally checked for the `%PDF` magic bytes so a
    /// mislabelled file produces a clear error instead of a parser crash
    /// deeper in the pipeline.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let media_type = MediaType::from_extension(ext).ok_or_else(|| {
            AnalyzerError::UnsupportedMediaType {
                declared: if ext.is_empty() {
                    "<no extension>".to_string()
                } else {
                    ext.to_string()
                },
            }
        })?;

        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => AnalyzerError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => AnalyzerError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;

        if media_type == MediaType::Pdf && bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
            let mut magic = [0u8; 4];
            magic.copy_from_slice(&bytes[..4]);
            return Err(AnalyzerError::NotAPdf {
                path: path.to_path_buf(),
                magic,
            });
        }

        debug!(
            "Loaded {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            media_type.as_mime()
        );
        Ok(Self { bytes, media_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_allowlist() {
        assert_eq!(MediaType::from_declared("image/jpeg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_declared("image/jpg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_declared("image/png"), Some(MediaType::Png));
        assert_eq!(
            MediaType::from_declared("application/pdf"),
            Some(MediaType::Pdf)
        );
        assert_eq!(MediaType::from_declared("image/gif"), None);
        assert_eq!(MediaType::from_declared("text/plain"), None);
        assert_eq!(MediaType::from_declared(""), None);
    }

    #[test]
    fn declared_type_is_case_insensitive() {
        assert_eq!(MediaType::from_declared("Image/JPEG"), Some(MediaType::Jpeg));
        assert_eq!(
            MediaType::from_declared(" application/PDF "),
            Some(MediaType::Pdf)
        );
    }

    #[test]
    fn extension_allowlist() {
        assert_eq!(MediaType::from_extension("jpg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_extension("JPEG"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_extension("png"), Some(MediaType::Png));
        assert_eq!(MediaType::from_extension("pdf"), Some(MediaType::Pdf));
        assert_eq!(MediaType::from_extension("docx"), None);
        assert_eq!(MediaType::from_extension("gif"), None);
    }

    #[test]
    fn image_branch_predicate() {
        assert!(MediaType::Jpeg.is_image());
        assert!(MediaType::Png.is_image());
        assert!(!MediaType::Pdf.is_image());
    }

    #[test]
    fn unsupported_declared_type_is_rejected() {
        let err = UploadedDocument::new(vec![1, 2, 3], "image/webp").unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::UnsupportedMediaType { declared } if declared == "image/webp"
        ));
    }

    #[test]
    fn accepted_document_keeps_bytes() {
        let doc = UploadedDocument::new(vec![0xFF, 0xD8], "image/jpeg").unwrap();
        assert_eq!(doc.bytes, vec![0xFF, 0xD8]);
        assert_eq!(doc.media_type, MediaType::Jpeg);
    }

    #[test]
    fn from_path_rejects_unknown_extension() {
        let err = UploadedDocument::from_path("/tmp/report.txt").unwrap_err();
        assert!(matches!(err, AnalyzerError::UnsupportedMediaType { .. }));
    }

    #[test]
    fn from_path_missing_file() {
        let err = UploadedDocument::from_path("/nonexistent/report.pdf").unwrap_err();
        assert!(matches!(err, AnalyzerError::FileNotFound { .. }));
    }
}
