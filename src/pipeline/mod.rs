// src/pipeline/mod.rs
//
// One render pass: cached submissions -> catalog -> per-entry document
// fetch, classification and (optionally) AI paragraph. Strictly sequential:
// at most one document fetch and one AI call in flight at a time, with the
// configured pacing delays as minimum inter-call spacing. That is a
// rate-limit compliance contract, not a throughput choice.

use std::time::Duration;

use crate::ai::AiSummarizer;
use crate::cache::{Caches, AI_SUMMARY_TTL, DOCUMENT_TTL, SUBMISSIONS_TTL, TICKER_MAP_TTL};
use crate::classifier::{self, Classification};
use crate::edgar::catalog::{build_catalog, CatalogFilter};
use crate::edgar::client::EdgarClient;
use crate::edgar::models::{Cik, FilingEntry};
use crate::extractors::text::html_to_text;
use crate::utils::error::EdgarError;

const TICKER_MAP_KEY: &str = "company_tickers";

/// Knobs for a single render pass, mirroring the dashboard controls.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub forms: Vec<String>,
    pub keyword: Option<String>,
    pub max_filings: usize,
    pub ai_enabled: bool,
    pub max_ai_calls: usize,
    pub ai_delay: Duration,
    pub doc_delay: Duration,
}

/// One fully summarized filing.
pub struct FilingSummary {
    pub entry: FilingEntry,
    pub classification: Classification,
    pub paragraph: String,
    pub ai_generated: bool,
}

/// A filing whose document could not be fetched; the failure is local to
/// the entry and reported inline rather than aborting the pass.
pub struct SkippedFiling {
    pub accession_number: String,
    pub error: String,
}

pub struct RenderReport {
    pub company_name: String,
    pub cik: Cik,
    pub summaries: Vec<FilingSummary>,
    pub skipped: Vec<SkippedFiling>,
}

/// Per-run cap on AI-path consults. Counting consults (cache hits included)
/// keeps the AI rows deterministic: exactly the first K displayed entries
/// take the AI path.
struct AiBudget {
    used: usize,
    cap: usize,
}

impl AiBudget {
    fn new(cap: usize) -> AiBudget {
        AiBudget { used: 0, cap }
    }

    fn try_consume(&mut self) -> bool {
        if self.used < self.cap {
            self.used += 1;
            true
        } else {
            false
        }
    }
}

/// Resolves a ticker symbol to a CIK through the cached ticker map.
/// Ok(None) means "ticker not resolvable" - a notice, not an error.
pub async fn cik_from_ticker(
    client: &EdgarClient,
    caches: &Caches,
    ticker: &str,
) -> Result<Option<Cik>, EdgarError> {
    if ticker.trim().is_empty() {
        return Ok(None);
    }
    let map = match caches.ticker_map.get(TICKER_MAP_KEY) {
        Some(map) => map,
        None => {
            let map = client.fetch_ticker_map().await?;
            caches.ticker_map.insert(TICKER_MAP_KEY, map.clone(), TICKER_MAP_TTL);
            map
        }
    };
    Ok(map.cik_for(ticker))
}

/// Runs one synchronous top-to-bottom evaluation for a company.
///
/// Submission-fetch failure is fatal to the pass; a document-fetch failure
/// skips only that entry; classification cannot fail; the AI path never
/// fails, it only declines.
pub async fn render_pass(
    client: &EdgarClient,
    ai: &AiSummarizer,
    caches: &Caches,
    cik: &Cik,
    opts: &RenderOptions,
) -> Result<RenderReport, EdgarError> {
    let submission = match caches.submissions.get(cik.as_str()) {
        Some(cached) => cached,
        None => {
            let fetched = client.fetch_submissions(cik).await?;
            caches
                .submissions
                .insert(cik.as_str(), fetched.clone(), SUBMISSIONS_TTL);
            fetched
        }
    };

    let filter = CatalogFilter {
        forms: opts.forms.clone(),
        keyword: opts.keyword.clone(),
        max_entries: opts.max_filings,
    };
    let catalog = build_catalog(cik, &submission, &filter);
    tracing::info!(
        "{} (CIK {}): {} filings after filters",
        submission.name,
        cik,
        catalog.len()
    );

    let ai_cap = if opts.ai_enabled && ai.is_enabled() {
        opts.max_ai_calls
    } else {
        0
    };
    let mut budget = AiBudget::new(ai_cap);
    let mut summaries = Vec::new();
    let mut skipped = Vec::new();

    for entry in catalog {
        let text = match document_text(client, caches, cik, &entry, opts.doc_delay).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", entry.accession_number, e);
                skipped.push(SkippedFiling {
                    accession_number: entry.accession_number.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        let classification = classifier::classify(&entry.form, &text);

        let (paragraph, ai_generated) = if budget.try_consume() {
            ai_paragraph(ai, caches, &entry, &text, &classification, opts.ai_delay).await
        } else {
            (classification.to_paragraph(), false)
        };

        summaries.push(FilingSummary {
            entry,
            classification,
            paragraph,
            ai_generated,
        });
    }

    Ok(RenderReport {
        company_name: submission.name.clone(),
        cik: cik.clone(),
        summaries,
        skipped,
    })
}

/// Cached document text, keyed by (cik, accession, document). The pacing
/// delay applies before each network fetch; cache hits cost nothing and
/// wait for nothing. Failures are propagated, never cached.
async fn document_text(
    client: &EdgarClient,
    caches: &Caches,
    cik: &Cik,
    entry: &FilingEntry,
    delay: Duration,
) -> Result<String, EdgarError> {
    let key = format!(
        "{}|{}|{}",
        cik, entry.accession_number, entry.primary_document
    );
    if let Some(cached) = caches.documents.get(&key) {
        return Ok(cached);
    }
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let html = client.fetch_document(&entry.primary_doc_url).await?;
    let text = html_to_text(&html);
    caches.documents.insert(key, text.clone(), DOCUMENT_TTL);
    Ok(text)
}

/// Cached AI paragraph with rule-based fallback. The pacing delay applies
/// before each live invocation only; a declined summary is never cached, so
/// a later pass (or rotated credential) retries it.
async fn ai_paragraph(
    ai: &AiSummarizer,
    caches: &Caches,
    entry: &FilingEntry,
    text: &str,
    classification: &Classification,
    delay: Duration,
) -> (String, bool) {
    let excerpt = AiSummarizer::excerpt_of(text);
    let key = ai.cache_key(&entry.accession_number, &excerpt);

    if let Some(cached) = caches.ai_summaries.get(&key) {
        return (cached, true);
    }

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    match ai
        .one_paragraph(&entry.accession_number, &entry.form, &excerpt)
        .await
    {
        Some(summary) => {
            caches
                .ai_summaries
                .insert(key, summary.clone(), AI_SUMMARY_TTL);
            (summary, true)
        }
        None => (classification.to_paragraph(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_allows_exactly_the_first_k() {
        let mut budget = AiBudget::new(5);
        let consults: Vec<bool> = (0..8).map(|_| budget.try_consume()).collect();
        let expected = [true, true, true, true, true, false, false, false];
        assert_eq!(consults, expected);
    }

    #[test]
    fn zero_budget_never_consults() {
        let mut budget = AiBudget::new(0);
        assert!(!budget.try_consume());
        assert!(!budget.try_consume());
    }

    #[tokio::test]
    async fn empty_ticker_resolves_to_none_without_fetching() {
        // An empty ticker must short-circuit before any network work; this
        // would otherwise fail on the missing ticker-map fetch.
        let client = EdgarClient::new("test-agent (test@example.com)").unwrap();
        let caches = Caches::new();
        let resolved = cik_from_ticker(&client, &caches, "   ").await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn pre_populated_ticker_map_resolves_from_cache() {
        use crate::edgar::models::{TickerEntry, TickerMap};
        use std::collections::HashMap;

        let client = EdgarClient::new("test-agent (test@example.com)").unwrap();
        let caches = Caches::new();
        let mut map = HashMap::new();
        map.insert(
            "0".to_string(),
            TickerEntry {
                cik_str: 1829311,
                ticker: "BMNR".to_string(),
                title: "Bitmine Immersion Technologies, Inc.".to_string(),
            },
        );
        caches.ticker_map.insert(
            TICKER_MAP_KEY,
            TickerMap::from_index_map(map),
            TICKER_MAP_TTL,
        );

        let resolved = cik_from_ticker(&client, &caches, "bmnr").await.unwrap();
        assert_eq!(resolved.unwrap().as_str(), "0001829311");
    }
}
