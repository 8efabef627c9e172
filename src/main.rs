// src/main.rs
mod ai;
mod cache;
mod classifier;
mod edgar;
mod extractors;
mod pipeline;
mod utils;

use clap::Parser;
use std::time::Duration;

use ai::AiSummarizer;
use cache::Caches;
use edgar::client::EdgarClient;
use edgar::models::Cik;
use pipeline::{RenderOptions, RenderReport};
use utils::AppError;

// SEC requires a descriptive User-Agent; operators should override this via
// SEC_USER_AGENT with their own contact details.
const DEFAULT_USER_AGENT: &str = "FilingsDashboard/1.0 (contact: please-set-email@example.com)";
const FALLBACK_CIK: &str = "0001829311"; // BMNR

const FORM_VOCABULARY: [&str; 11] = [
    "8-K", "10-Q", "10-K", "S-3", "S-3ASR", "S-1", "4", "13D", "13G", "SC 13D", "SC 13G",
];

/// Command Line Interface for the SEC filings dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ticker symbol to look up (e.g. BMNR); ignored when --cik is given
    #[arg(short, long)]
    ticker: Option<String>,

    /// CIK to look up directly (digits; zero-padding optional)
    #[arg(short, long)]
    cik: Option<String>,

    /// Maximum filings to display (5-100)
    #[arg(long, default_value_t = 30)]
    max_filings: usize,

    /// Restrict to specific form types (repeatable)
    #[arg(long = "form", value_parser = clap::builder::PossibleValuesParser::new(FORM_VOCABULARY))]
    forms: Vec<String>,

    /// Free-text keyword filter applied across all entry fields
    #[arg(short, long)]
    keyword: Option<String>,

    /// Enable AI summaries (requires OPENAI_API_KEY)
    #[arg(long)]
    ai: bool,

    /// AI model name
    #[arg(long, default_value = ai::DEFAULT_MODEL)]
    ai_model: String,

    /// Maximum AI calls per render pass (0-20)
    #[arg(long, default_value_t = 5)]
    max_ai_calls: usize,

    /// Delay before each AI call, in milliseconds (0-3000)
    #[arg(long, default_value_t = 0)]
    ai_delay_ms: u64,

    /// Delay before each document fetch, in milliseconds (0-3000)
    #[arg(long, default_value_t = 300)]
    doc_delay_ms: u64,

    /// Clear all caches before the first pass (forces fresh summaries)
    #[arg(long)]
    refresh: bool,

    /// Re-run the render pass every N seconds; caches persist across passes
    #[arg(long)]
    watch: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting with args: {:?}", args);

    let user_agent =
        std::env::var("SEC_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
    let api_key = std::env::var("OPENAI_API_KEY").ok();

    let client = EdgarClient::new(&user_agent)?;
    let ai = AiSummarizer::new(api_key, &args.ai_model);
    let caches = Caches::new();
    if args.refresh {
        caches.clear_all();
    }

    if args.ai && !ai.is_enabled() {
        tracing::warn!("AI summaries requested but OPENAI_API_KEY is not set; using rule-based summaries");
    } else if args.ai {
        tracing::info!("AI summaries enabled (model {})", ai.model());
    }

    let opts = RenderOptions {
        forms: args.forms.clone(),
        keyword: args.keyword.clone(),
        max_filings: args.max_filings.clamp(5, 100),
        ai_enabled: args.ai,
        max_ai_calls: args.max_ai_calls.min(20),
        ai_delay: Duration::from_millis(args.ai_delay_ms.min(3_000)),
        doc_delay: Duration::from_millis(args.doc_delay_ms.min(3_000)),
    };

    // 3. Resolve the company identifier: --cik wins, then --ticker, then the
    // DEFAULT_CIK environment fallback.
    let cik = match (&args.cik, &args.ticker) {
        (Some(raw), _) => Some(
            Cik::pad(raw)
                .ok_or_else(|| AppError::Config(format!("CIK '{}' contains no digits", raw)))?,
        ),
        (None, Some(ticker)) => {
            match pipeline::cik_from_ticker(&client, &caches, ticker).await? {
                Some(cik) => Some(cik),
                None => {
                    println!("Ticker {} could not be resolved to a CIK.", ticker);
                    return Ok(());
                }
            }
        }
        (None, None) => {
            let fallback =
                std::env::var("DEFAULT_CIK").unwrap_or_else(|_| FALLBACK_CIK.to_string());
            Cik::pad(&fallback)
        }
    };
    let Some(cik) = cik else {
        println!("Enter a ticker or CIK to begin.");
        return Ok(());
    };

    // 4. Render, once or on an interval.
    match args.watch {
        Some(secs) => {
            let interval = Duration::from_secs(secs.max(1));
            loop {
                match pipeline::render_pass(&client, &ai, &caches, &cik, &opts).await {
                    Ok(report) => print_report(&report),
                    Err(e) => tracing::error!("Render pass failed: {}", e),
                }
                tracing::info!("Next pass in {:?}", interval);
                tokio::time::sleep(interval).await;
            }
        }
        None => {
            let report = pipeline::render_pass(&client, &ai, &caches, &cik, &opts).await?;
            print_report(&report);
        }
    }

    Ok(())
}

fn print_report(report: &RenderReport) {
    println!();
    println!("{} — CIK {}", report.company_name, report.cik);

    if report.summaries.is_empty() && report.skipped.is_empty() {
        println!("No recent filings found.");
        return;
    }

    println!();
    println!(
        "{:<12} {:<10} {:<22} {}",
        "Date", "Form", "Accession", "Description"
    );
    for summary in &report.summaries {
        let entry = &summary.entry;
        let description: String = entry.primary_doc_description.chars().take(60).collect();
        println!(
            "{:<12} {:<10} {:<22} {}",
            entry.filing_date, entry.form, entry.accession_number, description
        );
    }

    for summary in &report.summaries {
        let entry = &summary.entry;
        println!();
        println!(
            "{} | {} | {}",
            entry.filing_date, entry.form, entry.primary_doc_description
        );
        println!("  Accession: {}", entry.accession_number);
        println!("  Index:     {}", entry.index_url);
        println!("  Document:  {}", entry.primary_doc_url);
        println!("  Impact:    {}", summary.classification.impact);

        let flagged: Vec<&str> = summary
            .classification
            .hits
            .iter()
            .into_iter()
            .filter(|(_, hit)| *hit)
            .map(|(name, _)| name)
            .collect();
        if !flagged.is_empty() {
            println!("  Flags:     {}", flagged.join(", "));
        }

        let label = if summary.ai_generated { "AI summary" } else { "Summary" };
        println!("  {}:", label);
        for line in summary.paragraph.lines() {
            println!("    {}", line);
        }
    }

    for skipped in &report.skipped {
        println!();
        println!(
            "  {}: failed to fetch primary document: {}",
            skipped.accession_number, skipped.error
        );
    }

    println!();
    println!("Data: SEC EDGAR. Summaries are heuristic or AI-generated — not investment advice.");
}
