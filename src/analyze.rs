//! Report analysis: extracted text into structured markers.
//!
//! One prompt, one completion, one parse. The analyzer refuses blank
//! input up front so no API call is spent on an empty report.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::extract::TextExtractor;
use crate::output::{AnalysisResult, ExtractedText};
use crate::pipeline::llm::{resolve_provider, CompletionClient, ModelClient};
use crate::prompts::extraction_prompt;
use std::sync::Arc;
use tracing::info;

/// Sends report text through the extraction prompt and parses the result.
pub struct ReportAnalyzer {
    client: Arc<dyn CompletionClient>,
}

impl std::fmt::Debug for ReportAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportAnalyzer").finish_non_exhaustive()
    }
}

impl ReportAnalyzer {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Analyze extracted report text.
    ///
    /// Callers must check [`ExtractedText::is_blank`] first; blank input is
    /// rejected as [`AnalyzerError::NothingToAnalyze`] rather than burning
    /// an API call on an empty prompt.
    pub async fn analyze(&self, text: &ExtractedText) -> Result<AnalysisResult, AnalyzerError> {
        if text.is_blank() {
            return Err(AnalyzerError::NothingToAnalyze);
        }

        let prompt = extraction_prompt(&text.joined());
        let raw = self.client.complete(&prompt).await?;
        let result = crate::pipeline::parse::parse_markers(&raw);
        info!(
            "Analysis {}: {} markers",
            if result.is_parsed() { "parsed" } else { "unparsed" },
            result.markers().map_or(0, |m| m.len())
        );
        Ok(result)
    }
}

/// Wire up the full pipeline from a configuration.
///
/// Resolves the LLM provider first — a missing credential fails here,
/// before any document is read — then builds the extractor and analyzer
/// around it. The default OCR backend transcribes via the same provider;
/// with the `ocr-tesseract` feature, recognition runs locally instead.
pub fn build_pipeline(
    config: AnalyzerConfig,
) -> Result<(TextExtractor, ReportAnalyzer), AnalyzerError> {
    let provider = resolve_provider(&config)?;

    #[cfg(feature = "ocr-tesseract")]
    let ocr: Arc<dyn crate::ocr::OcrEngine> = Arc::new(crate::ocr::TesseractOcr::new(
        &config.ocr_language,
        config.tessdata_dir.clone(),
    ));
    #[cfg(not(feature = "ocr-tesseract"))]
    let ocr: Arc<dyn crate::ocr::OcrEngine> = Arc::new(crate::ocr::VisionOcr::new(
        Arc::clone(&provider),
        config.max_tokens,
    ));

    let client: Arc<dyn CompletionClient> = Arc::new(ModelClient::new(provider, &config));

    Ok((
        TextExtractor::new(ocr, config),
        ReportAnalyzer::new(client),
    ))
}
