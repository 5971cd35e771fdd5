//! CLI binary for labmark.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalyzerConfig`, runs extraction and analysis, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use labmark::{build_pipeline, AnalysisResult, AnalyzerConfig, MarkerMap, UploadedDocument};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract text and analyze a scanned report photo
  labmark report.jpg --analyze

  # PDF with a native text layer (no OCR involved)
  labmark results.pdf --analyze

  # Extraction only, no LLM analysis of the text
  labmark report.png --extract-only

  # Machine-readable output
  labmark results.pdf --analyze --json > markers.json

  # Use a specific model
  labmark --model gemini-1.5-pro results.pdf --analyze

SUPPORTED UPLOADS:
  .jpg / .jpeg    image/jpeg
  .png            image/png
  .pdf            application/pdf (text layer preferred, OCR fallback per page)

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY      Google Gemini API key (preferred provider)
  OPENAI_API_KEY      OpenAI API key
  ANTHROPIC_API_KEY   Anthropic API key
  LABMARK_MODEL       Override model ID
  LABMARK_PROVIDER    Override provider (gemini, openai, anthropic, ollama)
  PDFIUM_LIB_PATH     Path to an existing libpdfium for scanned-PDF rendering

NOTES:
  The extraction output is informational, not medical advice. Always review
  results with a qualified clinician.
"#;

/// Extract health markers from medical report uploads.
#[derive(Parser, Debug)]
#[command(
    name = "labmark",
    version,
    about = "Extract structured health markers from medical reports (JPEG, PNG, PDF)",
    long_about = "Upload a medical report as an image or PDF, recover its text (native PDF text \
layer when present, OCR otherwise), and extract test markers as structured JSON via an LLM.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Report file: .jpg, .jpeg, .png, or .pdf.
    input: PathBuf,

    /// Run LLM analysis without asking for confirmation.
    #[arg(short, long, env = "LABMARK_ANALYZE")]
    analyze: bool,

    /// Stop after text extraction, never call the analysis prompt.
    #[arg(long, conflicts_with = "analyze")]
    extract_only: bool,

    /// LLM model ID (e.g. gemini-1.5-flash, gemini-1.5-pro, gpt-4.1-mini).
    #[arg(long, env = "LABMARK_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama.
    #[arg(
        long,
        env = "LABMARK_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set;\n\
          a GEMINI_API_KEY wins over other keys."
    )]
    provider: Option<String>,

    /// Max LLM output tokens.
    #[arg(long, env = "LABMARK_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Max width in pixels when rasterising scanned PDF pages.
    #[arg(long, env = "LABMARK_RENDER_WIDTH", default_value_t = 2000)]
    render_width: u32,

    /// Output structured JSON instead of a marker table.
    #[arg(long, env = "LABMARK_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LABMARK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, env = "LABMARK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config and resolve the provider ────────────────────────────
    // The provider is resolved before the file is even read: a missing
    // credential should fail immediately, not after OCR has run.
    let mut builder = AnalyzerConfig::builder()
        .max_tokens(cli.max_tokens)
        .max_render_width(cli.render_width);
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    let (extractor, analyzer) = build_pipeline(config).context(
        "No LLM provider configured. Set GEMINI_API_KEY (or another provider key) and retry.",
    )?;

    // ── Load and extract ─────────────────────────────────────────────────
    let doc = UploadedDocument::from_path(&cli.input)
        .with_context(|| format!("Cannot read {}", cli.input.display()))?;

    let spinner = make_spinner(&cli, "Extracting text from report…");
    let text = extractor
        .extract(&doc)
        .await
        .context("Text extraction failed")?;
    if let Some(s) = &spinner {
        s.finish_and_clear();
    }

    if text.is_blank() {
        eprintln!(
            "{} {}",
            yellow("⚠"),
            bold("No text could be extracted from this document."),
        );
        eprintln!(
            "  {}",
            dim("The scan may be blank, too low-resolution, or upside down. Analysis skipped."),
        );
        return Ok(());
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "{} Extracted {} page(s){}",
            green("✔"),
            bold(&text.pages.len().to_string()),
            if text.ocr_page_count() > 0 {
                dim(&format!("  ({} via OCR)", text.ocr_page_count()))
            } else {
                String::new()
            },
        );
    }
    if !cli.json {
        println!("{}", text.joined());
    }

    if cli.extract_only {
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&text).context("Failed to serialise text")?
            );
        }
        return Ok(());
    }

    // ── Confirm before spending an API call, unless --analyze ────────────
    if !cli.analyze && !confirm_analysis()? {
        eprintln!("{}", dim("Analysis skipped."));
        return Ok(());
    }

    // ── Analyze ──────────────────────────────────────────────────────────
    let spinner = make_spinner(&cli, "Analyzing report…");
    let result = analyzer.analyze(&text).await.context("Analysis failed")?;
    if let Some(s) = &spinner {
        s.finish_and_clear();
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise result")?
        );
        return Ok(());
    }

    match result {
        AnalysisResult::Markers { extracted_markers } => {
            print_marker_table(&extracted_markers);
        }
        AnalysisResult::Unparsed { raw } => {
            eprintln!(
                "{} {}",
                yellow("⚠"),
                bold("The model response was not structured JSON; raw output follows."),
            );
            println!("{raw}");
        }
    }

    Ok(())
}

/// Spinner shown while a long stage runs; `None` in quiet/json mode.
fn make_spinner(cli: &Cli, msg: &str) -> Option<ProgressBar> {
    if cli.quiet || cli.json || !io::stderr().is_terminal() {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

/// Ask the user whether to send the extracted text for analysis.
///
/// Non-interactive stdin (pipes, CI) counts as a "no": the API call is
/// never made implicitly.
fn confirm_analysis() -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    eprint!("{} Analyze this report with the LLM? [y/N] ", cyan("?"));
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read confirmation")?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Render markers as an aligned table with a colourised status column.
fn print_marker_table(markers: &MarkerMap) {
    if markers.is_empty() {
        eprintln!(
            "{} {}",
            yellow("⚠"),
            bold("No markers were found in this report."),
        );
        return;
    }

    let name_w = markers.keys().map(|k| k.len()).max().unwrap_or(6).max(6);

    println!(
        "{}",
        bold(&format!(
            "{:<name_w$}  {:>10}  {:<10}  {:<12}  {}",
            "Marker", "Value", "Unit", "Status", "Reference"
        ))
    );
    for (name, m) in markers {
        // Pad before colouring: ANSI escapes would throw off the width.
        let status = format!("{:<12}", m.status.as_deref().unwrap_or("-"));
        let coloured = match status.trim().to_lowercase().as_str() {
            "normal" => green(&status),
            "high" | "low" | "abnormal" | "critical" => red(&status),
            "borderline" => yellow(&status),
            _ => dim(&status),
        };
        println!(
            "{:<name_w$}  {:>10}  {:<10}  {}  {}",
            name,
            m.value,
            m.unit.as_deref().unwrap_or("-"),
            coloured,
            dim(m.reference_range.as_deref().unwrap_or("-")),
        );
    }
}
