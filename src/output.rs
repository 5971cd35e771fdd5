//! Output types: extracted text and the structured analysis result.
//!
//! Everything here is transient — produced for one upload/analyze cycle,
//! rendered, and discarded. Serde derives exist so the CLI can emit the
//! analysis as JSON, not because anything is persisted.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ── Extraction ───────────────────────────────────────────────────────────

/// How a page's text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSource {
    /// Text embedded in the PDF's content stream, used verbatim.
    NativeText,
    /// Text recognised by the OCR engine from a pixel grid.
    Ocr,
}

/// Text extracted from one page of the document.
///
/// Image inputs produce exactly one page with [`PageSource::Ocr`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number.
    pub number: usize,
    pub text: String,
    pub source: PageSource,
}

/// Ordered page-level text extracted from an uploaded document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedText {
    pub pages: Vec<PageText>,
}

impl ExtractedText {
    /// Single-page result for image inputs.
    pub fn single(text: String) -> Self {
        Self {
            pages: vec![PageText {
                number: 1,
                text,
                source: PageSource::Ocr,
            }],
        }
    }

    /// The full report text: page contributions joined with newlines,
    /// preserving page order.
    pub fn joined(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when nothing usable was extracted (empty or whitespace-only).
    ///
    /// A blank result is a terminal state, not an error: the shell shows a
    /// warning and withholds the analyze action.
    pub fn is_blank(&self) -> bool {
        self.joined().trim().is_empty()
    }

    /// Number of pages that fell back to OCR.
    pub fn ocr_page_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.source == PageSource::Ocr)
            .count()
    }
}

// ── Analysis ─────────────────────────────────────────────────────────────

/// One lab marker extracted by the model.
///
/// Field contents are taken from the model as-is: `status` is expected to be
/// one of Low/Normal/High/Borderline but is not validated — the original
/// behaviour trusts the response shape beyond JSON well-formedness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_range: Option<String>,
}

/// Marker mapping keyed by test name (keys unique, sorted for stable output).
pub type MarkerMap = BTreeMap<String, Marker>;

/// Outcome of one analysis attempt.
///
/// Parsing is all-or-nothing: either the whole response was valid JSON and
/// every marker is present, or the raw response is carried for display.
/// `Unparsed` is a recovered, user-visible condition — never a fatal error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisResult {
    Markers { extracted_markers: MarkerMap },
    Unparsed { raw: String },
}

impl AnalysisResult {
    /// The marker mapping, if the response parsed.
    pub fn markers(&self) -> Option<&MarkerMap> {
        match self {
            AnalysisResult::Markers { extracted_markers } => Some(extracted_markers),
            AnalysisResult::Unparsed { .. } => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, AnalysisResult::Markers { .. })
    }
}

/// Accept `"5.2"`, `5.2`, or `52` for a marker value.
///
/// The prompt asks for `"number/string"` and models oblige both ways;
/// rejecting bare JSON numbers would turn a perfectly usable response into
/// an `Unparsed` fallback.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    match v {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for marker value, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_uses_newlines_between_pages() {
        let text = ExtractedText {
            pages: vec![
                PageText {
                    number: 1,
                    text: "page one".into(),
                    source: PageSource::NativeText,
                },
                PageText {
                    number: 2,
                    text: "page two".into(),
                    source: PageSource::Ocr,
                },
            ],
        };
        assert_eq!(text.joined(), "page one\npage two");
        assert_eq!(text.ocr_page_count(), 1);
    }

    #[test]
    fn whitespace_only_is_blank() {
        let text = ExtractedText::single("   ".into());
        assert!(text.is_blank());

        let empty = ExtractedText::default();
        assert!(empty.is_blank());

        let real = ExtractedText::single("Hemoglobin 13.5 g/dL".into());
        assert!(!real.is_blank());
    }

    #[test]
    fn marker_accepts_numeric_value() {
        let m: Marker = serde_json::from_str(
            r#"{"value": 5.2, "unit": "mmol/L", "status": "Normal", "reference_range": "3.9-5.5"}"#,
        )
        .unwrap();
        assert_eq!(m.value, "5.2");
        assert_eq!(m.status.as_deref(), Some("Normal"));
    }

    #[test]
    fn marker_missing_fields_default_to_none() {
        let m: Marker = serde_json::from_str(r#"{"value": "12"}"#).unwrap();
        assert_eq!(m.value, "12");
        assert!(m.unit.is_none());
        assert!(m.reference_range.is_none());
    }

    #[test]
    fn unparsed_keeps_raw_text() {
        let r = AnalysisResult::Unparsed {
            raw: "Sorry, I cannot help.".into(),
        };
        assert!(!r.is_parsed());
        assert!(r.markers().is_none());
    }

    #[test]
    fn analysis_result_serialises_with_outcome_tag() {
        let r = AnalysisResult::Markers {
            extracted_markers: MarkerMap::new(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["outcome"], "markers");
        assert!(json["extracted_markers"].is_object());
    }
}
