//! OCR engines: pixel grid in, ordered text fragments out.
//!
//! The engine is the one long-lived service in the pipeline — constructed
//! once at startup and shared by reference for the life of the process.
//! Everything behind the trait is stateless per call, so a single instance
//! is safe to share between interactions.
//!
//! Two backends ship:
//!
//! * [`VisionOcr`] (default) — sends the page image to the configured LLM
//!   provider with a strict transcription prompt. No local model files, no
//!   system libraries; the same credential that powers analysis powers OCR.
//! * [`TesseractOcr`] (feature `ocr-tesseract`) — local recognition via the
//!   `tesseract` crate for fully offline extraction. Needs libtesseract and
//!   a tessdata directory at runtime.
//!
//! Neither backend exposes confidence or geometry; the extractor consumes
//! fragments in detection order and nothing else.

use crate::error::AnalyzerError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

/// Black-box OCR capability: `(pixel grid) -> ordered text fragments`.
///
/// Implementations must be `Send + Sync`; the extractor holds the engine in
/// an `Arc` and may call it from a blocking task.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognise text in the image, returning fragments in detection order.
    ///
    /// An image with no text yields an empty vector — that is a valid
    /// result, not an error.
    async fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, AnalyzerError>;
}

// ── Vision-LLM backend ───────────────────────────────────────────────────

/// OCR via the configured vision LLM.
///
/// The page is PNG-encoded (lossless — text crispness matters more than
/// payload size), base64-wrapped, and sent with [`crate::prompts::OCR_SYSTEM_PROMPT`].
/// Each non-empty response line becomes one fragment.
pub struct VisionOcr {
    provider: Arc<dyn edgequake_llm::LLMProvider>,
    max_tokens: usize,
}

impl VisionOcr {
    pub fn new(provider: Arc<dyn edgequake_llm::LLMProvider>, max_tokens: usize) -> Self {
        Self {
            provider,
            max_tokens,
        }
    }
}

#[async_trait]
impl OcrEngine for VisionOcr {
    async fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, AnalyzerError> {
        let b64 = encode_png_base64(image)?;
        let image_data = edgequake_llm::ImageData::new(b64, "image/png").with_detail("high");

        let messages = vec![
            edgequake_llm::ChatMessage::system(crate::prompts::OCR_SYSTEM_PROMPT),
            edgequake_llm::ChatMessage::user_with_images("", vec![image_data]),
        ];
        let options = edgequake_llm::CompletionOptions {
            temperature: Some(0.0),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| AnalyzerError::OcrFailed {
                detail: format!("vision transcription failed: {e}"),
            })?;

        let fragments = split_fragments(&response.content);
        debug!("Vision OCR returned {} fragments", fragments.len());
        Ok(fragments)
    }
}

/// Split raw transcription output into ordered fragments, one per
/// non-empty line.
pub(crate) fn split_fragments(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// PNG-encode an image and wrap it in base64 for a multimodal API payload.
pub(crate) fn encode_png_base64(img: &DynamicImage) -> Result<String, AnalyzerError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| AnalyzerError::Internal(format!("PNG encoding failed: {e}")))?;
    Ok(STANDARD.encode(&buf))
}

// ── Tesseract backend ────────────────────────────────────────────────────

/// Local OCR via Tesseract.
///
/// `set_image_from_mem` wants an encoded image, so the pixel grid is
/// PNG-encoded in memory first. Recognition is CPU-bound and runs under
/// `spawn_blocking`.
#[cfg(feature = "ocr-tesseract")]
pub struct TesseractOcr {
    tessdata_dir: Option<std::path::PathBuf>,
    language: String,
}

#[cfg(feature = "ocr-tesseract")]
impl TesseractOcr {
    /// Create an engine for the given OCR language code ("en", "fr", …).
    pub fn new(language: &str, tessdata_dir: Option<std::path::PathBuf>) -> Self {
        Self {
            tessdata_dir,
            language: tesseract_lang(language).to_string(),
        }
    }
}

#[cfg(feature = "ocr-tesseract")]
#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, AnalyzerError> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| AnalyzerError::Internal(format!("PNG encoding failed: {e}")))?;

        let tessdata = self
            .tessdata_dir
            .as_ref()
            .map(|d| d.to_string_lossy().into_owned());
        let lang = self.language.clone();

        let text = tokio::task::spawn_blocking(move || -> Result<String, AnalyzerError> {
            let tess = tesseract::Tesseract::new(tessdata.as_deref(), Some(&lang)).map_err(
                |e| AnalyzerError::OcrFailed {
                    detail: format!("tesseract init: {e:?}"),
                },
            )?;
            let mut tess =
                tess.set_image_from_mem(&buf)
                    .map_err(|e| AnalyzerError::OcrFailed {
                        detail: format!("tesseract set_image: {e:?}"),
                    })?;
            tess.get_text().map_err(|e| AnalyzerError::OcrFailed {
                detail: format!("tesseract recognition: {e:?}"),
            })
        })
        .await
        .map_err(|e| AnalyzerError::Internal(format!("OCR task panicked: {e}")))??;

        Ok(split_fragments(&text))
    }
}

/// Map a two-letter language code to Tesseract's traineddata naming.
#[cfg(feature = "ocr-tesseract")]
fn tesseract_lang(code: &str) -> &str {
    match code {
        "en" => "eng",
        "fr" => "fra",
        "de" => "deu",
        "es" => "spa",
        other => other,
    }
}
