//! Pipeline stages for report analysis.
//!
//! ```text
//! upload bytes ──> image::decode ──────────────┐
//!                                              ├──> extract::TextExtractor
//! upload bytes ──> pdf::native text / render ──┘           │
//!                                                          v
//!                                      llm::CompletionClient ──> parse::parse_markers
//! ```
//!
//! Each stage is a free function or small trait with explicit inputs and
//! outputs; orchestration lives in [`crate::extract`] and [`crate::analyze`].

pub mod image;
pub mod llm;
pub mod parse;
pub mod pdf;
