// src/edgar/catalog.rs
use crate::edgar::models::{Cik, CompanySubmission, FilingEntry};
use chrono::NaiveDate;

/// Display-side narrowing of the filing history. `forms` is an allow-list
/// (empty means all forms); `keyword` is a case-insensitive substring match
/// against the entry's serialized field values; `max_entries` bounds the
/// result after sorting.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub forms: Vec<String>,
    pub keyword: Option<String>,
    pub max_entries: usize,
}

/// Transforms a raw submission record into an ordered, filtered list of
/// filing entries, newest filing date first.
///
/// A missing or empty `filings.recent` block yields an empty catalog - that
/// is "no filings", not an error.
pub fn build_catalog(
    cik: &Cik,
    submission: &CompanySubmission,
    filter: &CatalogFilter,
) -> Vec<FilingEntry> {
    let recent = &submission.filings.recent;

    let mut entries: Vec<FilingEntry> = (0..recent.len())
        .filter_map(|i| FilingEntry::from_recent(cik, recent, i))
        .collect();

    if !filter.forms.is_empty() {
        entries.retain(|e| filter.forms.iter().any(|f| f == &e.form));
    }

    if let Some(keyword) = filter.keyword.as_deref() {
        let kw = keyword.trim().to_lowercase();
        if !kw.is_empty() {
            entries.retain(|e| e.haystack().contains(&kw));
        }
    }

    // Filing dates are ISO (YYYY-MM-DD); parse for ordering and fall back
    // to the raw string for anything malformed.
    entries.sort_by(|a, b| {
        let ka = NaiveDate::parse_from_str(&a.filing_date, "%Y-%m-%d").ok();
        let kb = NaiveDate::parse_from_str(&b.filing_date, "%Y-%m-%d").ok();
        kb.cmp(&ka).then_with(|| b.filing_date.cmp(&a.filing_date))
    });

    entries.truncate(filter.max_entries);
    tracing::debug!("Catalog built: {} entries after filters", entries.len());
    entries
}
