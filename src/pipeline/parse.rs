//! Response parsing: model output string into structured markers.
//!
//! Models routinely wrap JSON in Markdown code fences even when told not
//! to, so fence markers are stripped as literal substrings before parsing.
//! Anything that still fails to parse is preserved verbatim — the user
//! sees exactly what the model said, and nothing is silently dropped.

use crate::output::{AnalysisResult, MarkerMap};
use serde::Deserialize;
use tracing::warn;

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    extracted_markers: MarkerMap,
}

/// Parse a raw model response into an [`AnalysisResult`].
///
/// Infallible: a response that is not the expected JSON envelope becomes
/// [`AnalysisResult::Unparsed`] carrying the original, unstripped text.
pub fn parse_markers(raw: &str) -> AnalysisResult {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    match serde_json::from_str::<Envelope>(cleaned) {
        Ok(envelope) => AnalysisResult::Markers {
            extracted_markers: envelope.extracted_markers,
        },
        Err(e) => {
            warn!("Model response is not a marker envelope: {e}");
            AnalysisResult::Unparsed {
                raw: raw.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_envelope() {
        let raw = r#"{"extracted_markers": {"Hemoglobin": {"value": "13.5", "unit": "g/dL", "status": "normal", "reference_range": "12.0-15.5"}}}"#;
        let result = parse_markers(raw);
        let markers = result.markers().unwrap();
        assert_eq!(markers.len(), 1);
        let m = &markers["Hemoglobin"];
        assert_eq!(m.value, "13.5");
        assert_eq!(m.unit.as_deref(), Some("g/dL"));
        assert_eq!(m.status.as_deref(), Some("normal"));
    }

    #[test]
    fn strips_code_fences_before_parsing() {
        let raw = "```json\n{\"extracted_markers\": {\"Glucose\": {\"value\": \"5.2\"}}}\n```";
        let result = parse_markers(raw);
        assert!(result.is_parsed());
        assert_eq!(result.markers().unwrap()["Glucose"].value, "5.2");
    }

    #[test]
    fn numeric_values_are_accepted_as_strings() {
        let raw = r#"{"extracted_markers": {"WBC": {"value": 6.1, "unit": "10^9/L"}}}"#;
        let markers = parse_markers(raw).markers().unwrap().clone();
        assert_eq!(markers["WBC"].value, "6.1");
    }

    #[test]
    fn fenced_empty_envelope_yields_empty_mapping() {
        let result = parse_markers("```json\n{\"extracted_markers\": {}}\n```");
        assert!(result.is_parsed());
        assert!(result.markers().unwrap().is_empty());
    }

    #[test]
    fn missing_envelope_key_yields_empty_markers() {
        let result = parse_markers("{}");
        assert!(result.is_parsed());
        assert!(result.markers().unwrap().is_empty());
    }

    #[test]
    fn non_json_keeps_original_text_verbatim() {
        let raw = "```json\nI could not find any markers in this report.\n```";
        match parse_markers(raw) {
            AnalysisResult::Unparsed { raw: kept } => assert_eq!(kept, raw),
            other => panic!("expected Unparsed, got {other:?}"),
        }
    }

    #[test]
    fn prose_around_json_is_unparsed() {
        let raw = "Here are your results: {\"extracted_markers\": {}}";
        assert!(!parse_markers(raw).is_parsed());
    }

    #[test]
    fn marker_names_iterate_in_sorted_order() {
        let raw = r#"{"extracted_markers": {"Zinc": {"value": "1"}, "Albumin": {"value": "2"}}}"#;
        let markers = parse_markers(raw).markers().unwrap().clone();
        let names: Vec<_> = markers.keys().cloned().collect();
        assert_eq!(names, vec!["Albumin", "Zinc"]);
    }
}
