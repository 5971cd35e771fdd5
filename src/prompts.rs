//! Prompt templates for marker extraction and vision transcription.
//!
//! Centralising the prompts here keeps them independently testable and means
//! changing the instruction wording touches exactly one file — the LLM call
//! sites never embed prompt text of their own.

/// Extraction prompt sent with the report text embedded verbatim.
///
/// The model is instructed to answer with a single JSON object and nothing
/// else; [`crate::pipeline::parse`] still strips code fences, since models
/// wrap their output anyway often enough to matter.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract lab test names, values, and units from this medical report text:

{report_text}

Return JSON with this exact format:
{
  "extracted_markers": {
    "TestName": { "value": "number/string", "unit": "string", "status": "Low|Normal|High|Borderline", "reference_range": "string" }
  }
}
Only output valid JSON. Do not include conversational text."#;

/// Build the extraction prompt with the report text embedded verbatim.
pub fn extraction_prompt(report_text: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE.replace("{report_text}", report_text)
}

/// System prompt for the vision-OCR engine.
///
/// Plain-text transcription only: one detected region per line, reading
/// order preserved, no markup. The extraction prompt downstream does the
/// structuring — asking for Markdown here would only add noise to strip.
pub const OCR_SYSTEM_PROMPT: &str = "\
You are an optical character recognition engine. Transcribe every piece of \
visible text in the image exactly as it appears, one text region per line, \
preserving the natural reading order. Output only the transcribed text — \
no commentary, no formatting markup, no descriptions of the image.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_text_verbatim() {
        let text = "Hemoglobin: 13.5 g/dL (13.0 - 17.0)\nGlucose: 5.2 mmol/L";
        let prompt = extraction_prompt(text);
        assert!(prompt.contains(text));
        assert!(!prompt.contains("{report_text}"));
    }

    #[test]
    fn prompt_specifies_contract() {
        let prompt = extraction_prompt("x");
        assert!(prompt.contains("\"extracted_markers\""));
        assert!(prompt.contains("Low|Normal|High|Borderline"));
        assert!(prompt.contains("Only output valid JSON"));
    }

    #[test]
    fn ocr_prompt_forbids_commentary() {
        assert!(OCR_SYSTEM_PROMPT.contains("no commentary"));
    }
}
