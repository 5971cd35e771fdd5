//! Error types for the labmark library.
//!
//! One error enum covers every *fatal* failure: the current document (or the
//! current analysis attempt) cannot proceed and the caller must start over
//! with a new upload or a fixed environment.
//!
//! Two outcomes the pipeline recognises are deliberately NOT errors:
//!
//! * **Empty extraction** — a document from which no text could be read is a
//!   terminal state surfaced by [`crate::output::ExtractedText::is_blank`];
//!   the shell warns and withholds analysis.
//! * **Unparseable model output** — a response that is not valid JSON is
//!   recovered into [`crate::output::AnalysisResult::Unparsed`] so the raw
//!   text can be shown for diagnosis.
//!
//! Keeping those out of the error type means a `?` anywhere in the pipeline
//! always signals "this request is over", never "show something softer".

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the labmark library.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Report file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The declared or inferred media type is outside the supported set.
    #[error(
        "Unsupported media type '{declared}'\nSupported inputs: image/jpeg, image/jpg, image/png, application/pdf."
    )]
    UnsupportedMediaType { declared: String },

    /// The file claims to be a PDF but lacks the `%PDF` magic bytes.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Image bytes could not be decoded into a pixel grid.
    #[error("Failed to decode image: {detail}")]
    ImageDecode { detail: String },

    /// PDF structure is corrupt and cannot be parsed.
    #[error("PDF is corrupt or unreadable: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { detail: String },

    /// Rasterising a scanned page failed.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The OCR engine failed on a page image.
    #[error("OCR failed: {detail}")]
    OcrFailed { detail: String },

    /// Analysis was requested for empty or whitespace-only text.
    ///
    /// Callers are expected to check `ExtractedText::is_blank` and warn
    /// instead; this variant guards the library contract when they don't.
    #[error("Nothing to analyze: the extracted text is empty.")]
    NothingToAnalyze,

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No usable LLM provider / API credential (fatal at startup).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM invocation itself failed (network, auth, quota, model).
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_media_type_display() {
        let e = AnalyzerError::UnsupportedMediaType {
            declared: "text/csv".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("text/csv"), "got: {msg}");
        assert!(msg.contains("application/pdf"));
    }

    #[test]
    fn provider_not_configured_display() {
        let e = AnalyzerError::ProviderNotConfigured {
            provider: "auto".into(),
            hint: "Set GEMINI_API_KEY".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("auto"));
        assert!(msg.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn rasterisation_failed_display() {
        let e = AnalyzerError::RasterisationFailed {
            page: 3,
            detail: "bad page object".into(),
        };
        assert!(e.to_string().contains("page 3"));
    }

    #[test]
    fn llm_api_error_includes_cause() {
        let e = AnalyzerError::LlmApiError {
            message: "429 quota exceeded".into(),
        };
        assert!(e.to_string().contains("quota exceeded"));
    }
}
