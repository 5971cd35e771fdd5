//! Text extraction: uploaded document into per-page text.
//!
//! Images go straight to OCR. PDFs are read through their native text
//! layer first; only pages whose text layer is blank are rasterised and
//! handed to OCR. A fully text-based PDF therefore never invokes the OCR
//! engine or the renderer at all.

use crate::config::AnalyzerConfig;
use crate::document::UploadedDocument;
use crate::error::AnalyzerError;
use crate::ocr::OcrEngine;
use crate::output::{ExtractedText, PageSource, PageText};
use crate::pipeline::image::decode_image;
use crate::pipeline::pdf::{self, PageRenderer, PdfiumRenderer};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns an uploaded document into ordered page text.
///
/// Stateless per call; one extractor serves any number of documents.
pub struct TextExtractor {
    ocr: Arc<dyn OcrEngine>,
    renderer: Arc<dyn PageRenderer>,
    config: AnalyzerConfig,
}

impl std::fmt::Debug for TextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextExtractor").finish_non_exhaustive()
    }
}

impl TextExtractor {
    /// Build an extractor with the production pdfium renderer.
    pub fn new(ocr: Arc<dyn OcrEngine>, config: AnalyzerConfig) -> Self {
        Self {
            ocr,
            renderer: Arc::new(PdfiumRenderer),
            config,
        }
    }

    /// Build an extractor with a caller-supplied page renderer.
    pub fn with_renderer(
        ocr: Arc<dyn OcrEngine>,
        renderer: Arc<dyn PageRenderer>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            ocr,
            renderer,
            config,
        }
    }

    /// Extract text from the document, page by page.
    ///
    /// The result may be blank (`ExtractedText::is_blank`). That is not an
    /// error: an empty page scan is a legitimate document, and the caller
    /// decides whether analysis still makes sense.
    pub async fn extract(&self, doc: &UploadedDocument) -> Result<ExtractedText, AnalyzerError> {
        if doc.media_type.is_image() {
            self.extract_image(doc).await
        } else {
            self.extract_pdf(doc).await
        }
    }

    async fn extract_image(&self, doc: &UploadedDocument) -> Result<ExtractedText, AnalyzerError> {
        let img = decode_image(&doc.bytes)?;
        let fragments = self.ocr.recognize(&img).await?;
        debug!("Image OCR: {} fragments", fragments.len());
        Ok(ExtractedText::single(fragments.join(" ")))
    }

    async fn extract_pdf(&self, doc: &UploadedDocument) -> Result<ExtractedText, AnalyzerError> {
        let native = pdf::native_page_text(doc.bytes.clone()).await?;

        let mut pages = Vec::with_capacity(native.len());
        for (idx, text) in native.into_iter().enumerate() {
            let number = idx + 1;
            if !text.trim().is_empty() {
                pages.push(PageText {
                    number,
                    text,
                    source: PageSource::NativeText,
                });
                continue;
            }

            debug!("Page {number}: no text layer, falling back to OCR");
            let img = self.render_page(&doc.bytes, number).await?;
            let fragments = self.ocr.recognize(&img).await?;
            pages.push(PageText {
                number,
                text: fragments.join(" "),
                source: PageSource::Ocr,
            });
        }

        let extracted = ExtractedText { pages };
        info!(
            "Extracted {} pages ({} via OCR)",
            extracted.pages.len(),
            extracted.ocr_page_count()
        );
        Ok(extracted)
    }

    async fn render_page(
        &self,
        bytes: &[u8],
        number: usize,
    ) -> Result<image::DynamicImage, AnalyzerError> {
        let renderer = Arc::clone(&self.renderer);
        let bytes = bytes.to_vec();
        let max_width = self.config.max_render_width;
        tokio::task::spawn_blocking(move || renderer.render_page(&bytes, number, max_width))
            .await
            .map_err(|e| AnalyzerError::Internal(format!("Render task panicked: {e}")))?
    }
}
