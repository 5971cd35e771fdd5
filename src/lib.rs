//! # labmark
//!
//! Extract structured health markers from medical report uploads using LLMs.
//!
//! ## Why this crate?
//!
//! Lab reports arrive as whatever the clinic produced: a phone photo of a
//! printout, a scanned PDF, or a properly generated PDF with a text layer.
//! This crate accepts all three, recovers the text (native layer when one
//! exists, OCR when not), and asks a language model to pull out the test
//! markers — name, value, unit, status, reference range — as JSON.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (JPEG / PNG / PDF)
//!  │
//!  ├─ 1. Validate  media type allowlist, %PDF magic check
//!  ├─ 2. Extract   native PDF text layer, OCR fallback per page
//!  ├─ 3. Prompt    fixed extraction prompt with the report text inlined
//!  ├─ 4. Complete  one chat call, temperature 0.0, no retries
//!  └─ 5. Parse     fence-stripped JSON → markers, or verbatim raw text
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use labmark::{build_pipeline, AnalyzerConfig, UploadedDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / other provider keys
//!     let config = AnalyzerConfig::default();
//!     let (extractor, analyzer) = build_pipeline(config)?;
//!
//!     let doc = UploadedDocument::from_path("report.pdf")?;
//!     let text = extractor.extract(&doc).await?;
//!     if text.is_blank() {
//!         eprintln!("no text could be extracted");
//!         return Ok(());
//!     }
//!     let result = analyzer.analyze(&text).await?;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `labmark` binary (clap + anyhow + tracing-subscriber) |
//! | `ocr-tesseract` | off | Local Tesseract OCR instead of the vision model (needs libtesseract) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! labmark = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{build_pipeline, ReportAnalyzer};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, DEFAULT_MODEL};
pub use document::{MediaType, UploadedDocument};
pub use error::AnalyzerError;
pub use extract::TextExtractor;
pub use ocr::{OcrEngine, VisionOcr};
pub use output::{AnalysisResult, ExtractedText, Marker, MarkerMap, PageSource, PageText};
pub use pipeline::llm::CompletionClient;
pub use pipeline::pdf::{PageRenderer, PdfiumRenderer};
