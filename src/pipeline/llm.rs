//! LLM interaction: provider resolution and the single-shot completion call.
//!
//! All prompt text lives in [`crate::prompts`]; this module only builds the
//! message list and maps transport failures onto the crate's error type.
//!
//! There is no retry layer. API failures surface immediately with the
//! provider's own message so the user decides whether to resubmit.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// The single capability the analyzer needs from a language model:
/// one prompt in, one raw response string out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzerError>;
}

/// Production client wrapping an `edgequake_llm` provider.
pub struct ModelClient {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &AnalyzerConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionClient for ModelClient {
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzerError> {
        let messages = vec![ChatMessage::user(prompt)];
        let options = CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let start = Instant::now();
        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| AnalyzerError::LlmApiError {
                message: e.to_string(),
            })?;

        debug!(
            "Completion in {}ms ({:?} prompt / {:?} completion tokens)",
            start.elapsed().as_millis(),
            response.prompt_tokens,
            response.completion_tokens
        );
        Ok(response.content)
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed
///    the provider entirely; used as-is. The injection point for tests and
///    custom middleware.
/// 2. **Explicit name** (`config.provider_name`) — routed through
///    [`ProviderFactory::create_llm_provider`] with the configured model,
///    reading the matching API key from the environment.
/// 3. **Gemini key** — a non-empty `GEMINI_API_KEY` selects Gemini with the
///    configured model. Checked before full auto-detection so a Gemini
///    deployment with multiple keys present still lands on Gemini.
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — the factory
///    scans known API key variables and picks the first available provider.
///
/// Resolution happens before any file is read: a missing credential is a
/// startup failure, not something discovered after OCR has run.
pub fn resolve_provider(
    config: &AnalyzerConfig,
) -> Result<Arc<dyn LLMProvider>, AnalyzerError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider(name, config.model_id());
    }

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            return create_provider("gemini", config.model_id());
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| AnalyzerError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY (or another supported key), or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

fn create_provider(name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, AnalyzerError> {
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        AnalyzerError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!(
                "Check the provider name and its API key environment variable \
                (e.g. GEMINI_API_KEY for gemini).\n{e}"
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;

    #[test]
    fn unknown_provider_fails_resolution_with_credential_hint() {
        let config = AnalyzerConfig::builder()
            .provider_name("not-a-real-provider")
            .build()
            .unwrap();

        let err = resolve_provider(&config).err().unwrap();
        match &err {
            AnalyzerError::ProviderNotConfigured { provider, hint } => {
                assert_eq!(provider, "not-a-real-provider");
                assert!(hint.contains("API key"), "hint was: {hint}");
            }
            other => panic!("expected ProviderNotConfigured, got {other:?}"),
        }
        assert!(err.to_string().contains("not-a-real-provider"));
    }
}
