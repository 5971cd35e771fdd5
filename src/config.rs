//! Configuration for report extraction and analysis.
//!
//! Every knob lives in [`AnalyzerConfig`], built via its builder. Keeping
//! the configuration in one struct makes it cheap to share across the
//! extractor and the analyzer and easy to log when two runs disagree.

use crate::error::AnalyzerError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default model identifier sent to the provider when none is configured.
///
/// Matches the hosted model the tool was designed around; any vision-capable
/// chat model the configured provider knows will work.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Configuration shared by the [`crate::extract::TextExtractor`] and the
/// [`crate::analyze::ReportAnalyzer`].
///
/// # Example
/// ```rust
/// use labmark::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .model("gemini-1.5-flash")
///     .max_tokens(2048)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// LLM model identifier. Default: [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai"). If unset along with
    /// `provider`, the provider is auto-detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.0.
    ///
    /// Zero keeps the completion deterministic so the same report text
    /// yields the same marker JSON on every run. There is no reason to
    /// raise this for extraction work.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per call. Default: 4096.
    ///
    /// A dense multi-panel lab report can produce a few hundred markers;
    /// 4096 covers that comfortably while keeping a runaway response bounded.
    pub max_tokens: usize,

    /// OCR language code. Default: "en".
    pub ocr_language: String,

    /// Maximum rendered page dimension (width or height) in pixels when a
    /// scanned page has to be rasterised. Default: 2000.
    ///
    /// Page sizes vary wildly; capping the longest edge keeps memory bounded
    /// regardless of the physical page size and stays within the image-size
    /// sweet spot for vision transcription.
    pub max_render_width: u32,

    /// Tessdata directory for the `ocr-tesseract` backend. Default: None
    /// (the tesseract library falls back to its compiled-in search path).
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.0,
            max_tokens: 4096,
            ocr_language: "en".to_string(),
            max_render_width: 2000,
            tessdata_dir: None,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("ocr_language", &self.ocr_language)
            .field("max_render_width", &self.max_render_width)
            .field("tessdata_dir", &self.tessdata_dir)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// The model identifier to request, falling back to [`DEFAULT_MODEL`].
    pub fn model_id(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn max_render_width(mut self, px: u32) -> Self {
        self.config.max_render_width = px.max(100);
        self
    }

    pub fn tessdata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.tessdata_dir = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(AnalyzerError::InvalidConfig(
                "ocr_language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_deterministic() {
        let c = AnalyzerConfig::default();
        assert_eq!(c.temperature, 0.0);
        assert_eq!(c.max_tokens, 4096);
        assert_eq!(c.ocr_language, "en");
        assert_eq!(c.model_id(), DEFAULT_MODEL);
    }

    #[test]
    fn temperature_is_clamped() {
        let c = AnalyzerConfig::builder()
            .temperature(-1.0)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 0.0);

        let c = AnalyzerConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let err = AnalyzerConfig::builder().max_tokens(0).build();
        assert!(matches!(err, Err(AnalyzerError::InvalidConfig(_))));
    }

    #[test]
    fn empty_ocr_language_rejected() {
        let err = AnalyzerConfig::builder().ocr_language("  ").build();
        assert!(matches!(err, Err(AnalyzerError::InvalidConfig(_))));
    }
}
