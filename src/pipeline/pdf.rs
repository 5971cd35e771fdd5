//! PDF handling: native text layer extraction and page rasterisation.
//!
//! Text-based PDFs never touch a rasteriser — `pdf-extract` reads the text
//! layer directly, page by page. Only pages whose text layer comes back
//! blank are rendered to pixels (via pdfium) and handed to OCR.
//!
//! Both pdfium and `pdf-extract` are CPU-bound, so callers run them under
//! `tokio::task::spawn_blocking`.

use crate::error::AnalyzerError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Extract the native text layer of every page, in page order.
///
/// Returns one string per page; a page without a text layer yields an
/// empty string at its position. A document pdf-extract cannot open maps
/// to [`AnalyzerError::CorruptPdf`].
pub async fn native_page_text(bytes: Vec<u8>) -> Result<Vec<String>, AnalyzerError> {
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
            AnalyzerError::CorruptPdf {
                detail: e.to_string(),
            }
        })
    })
    .await
    .map_err(|e| AnalyzerError::Internal(format!("Text extraction task panicked: {e}")))??;

    info!("PDF text layer: {} pages", pages.len());
    Ok(pages)
}

/// Rasterise a single PDF page to a pixel grid.
///
/// Implemented as a trait so scanned-page handling can be exercised without
/// a pdfium library on the test machine.
pub trait PageRenderer: Send + Sync {
    /// Render the 1-based page `number` of `bytes` at up to `max_width` px.
    fn render_page(
        &self,
        bytes: &[u8],
        number: usize,
        max_width: u32,
    ) -> Result<DynamicImage, AnalyzerError>;
}

/// Production renderer backed by pdfium.
///
/// `Pdfium::default()` binds to a system or bundled libpdfium at first
/// use; each call loads the document fresh, which keeps the renderer
/// stateless at the cost of re-parsing for multi-page scans. Scanned
/// report uploads are nearly always one or two pages, so the trade is
/// acceptable.
pub struct PdfiumRenderer;

impl PageRenderer for PdfiumRenderer {
    fn render_page(
        &self,
        bytes: &[u8],
        number: usize,
        max_width: u32,
    ) -> Result<DynamicImage, AnalyzerError> {
        let pdfium = Pdfium::default();
        let document =
            pdfium
                .load_pdf_from_byte_slice(bytes, None)
                .map_err(|e| AnalyzerError::CorruptPdf {
                    detail: format!("{e:?}"),
                })?;

        let page = document
            .pages()
            .get((number - 1) as u16)
            .map_err(|e| AnalyzerError::RasterisationFailed {
                page: number,
                detail: format!("{e:?}"),
            })?;

        let render_config = PdfRenderConfig::new()
            .set_target_width(max_width as i32)
            .set_maximum_height(max_width as i32);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| AnalyzerError::RasterisationFailed {
                    page: number,
                    detail: format!("{e:?}"),
                })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} -> {}x{} px",
            number,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}
