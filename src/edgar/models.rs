// src/edgar/models.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Archive root for filing documents and index pages.
pub const ARCHIVES_BASE: &str = "https://www.sec.gov/Archives";

/// A 10-digit zero-padded Central Index Key.
///
/// Construction strips non-digits from the raw input and zero-fills to ten
/// digits, so "1829311" and "CIK-1829311" both become "0001829311". Input
/// containing no digits at all yields `None` - callers must treat that as
/// "no identifier" rather than attempting a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cik(String);

impl Cik {
    pub fn pad(raw: &str) -> Option<Cik> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return None;
        }
        Some(Cik(format!("{:0>10}", digits)))
    }

    pub fn from_number(cik: u64) -> Cik {
        Cik(format!("{:010}", cik))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form with leading zeros stripped, as used in archive URLs.
    pub fn unpadded(&self) -> &str {
        let trimmed = self.0.trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structure representing the EDGAR company submission record.
/// Example: https://data.sec.gov/submissions/CIK0000320193.json
///
/// Only the fields this dashboard consumes are modeled; everything is
/// defaulted so a sparse or empty record deserializes to an empty filing
/// history instead of an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanySubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filings: Filings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filings {
    #[serde(default)]
    pub recent: RecentFilings,
}

/// The `filings.recent` block: equal-length parallel arrays, one per field,
/// one slot per filing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    #[serde(default)]
    pub accession_number: Vec<String>,
    #[serde(default)]
    pub filing_date: Vec<String>,
    #[serde(default)]
    pub report_date: Vec<String>,
    #[serde(default)]
    pub acceptance_date_time: Vec<String>,
    #[serde(default)]
    pub form: Vec<String>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub size: Vec<u64>,
    #[serde(default)]
    pub primary_document: Vec<String>,
    #[serde(default)]
    pub primary_doc_description: Vec<String>,
}

impl RecentFilings {
    pub fn len(&self) -> usize {
        self.accession_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accession_number.is_empty()
    }
}

/// One row of the company_tickers.json map.
/// The endpoint returns an object keyed by row index:
/// {"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}, ...}
#[derive(Debug, Clone, Deserialize)]
pub struct TickerEntry {
    pub cik_str: u64,
    pub ticker: String,
    pub title: String,
}

/// Read-only snapshot of the ticker -> CIK -> display-name lookup.
#[derive(Debug, Clone, Default)]
pub struct TickerMap {
    entries: Vec<TickerEntry>,
}

impl TickerMap {
    pub fn from_index_map(map: HashMap<String, TickerEntry>) -> TickerMap {
        TickerMap {
            entries: map.into_values().collect(),
        }
    }

    /// Case-insensitive ticker lookup.
    pub fn cik_for(&self, ticker: &str) -> Option<Cik> {
        if ticker.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.ticker.eq_ignore_ascii_case(ticker))
            .map(|e| Cik::from_number(e.cik_str))
    }
}

/// One normalized row of a company's filing history, with both derived URLs.
/// Constructed fresh on every catalog build; immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct FilingEntry {
    pub accession_number: String,
    pub filing_date: String,
    pub report_date: String,
    pub acceptance_date_time: String,
    pub form: String,
    pub items: String,
    pub size: u64,
    pub primary_document: String,
    pub primary_doc_description: String,
    pub index_url: String,
    pub primary_doc_url: String,
}

impl FilingEntry {
    /// Builds the row at `i` of the parallel arrays. Individual missing
    /// slots default to empty values; only a missing accession number makes
    /// the row unusable.
    pub fn from_recent(cik: &Cik, recent: &RecentFilings, i: usize) -> Option<FilingEntry> {
        let accession = recent.accession_number.get(i)?.clone();
        let primary_document = recent
            .primary_document
            .get(i)
            .cloned()
            .unwrap_or_default();
        let acc_nodash = accession.replace('-', "");

        Some(FilingEntry {
            index_url: format!(
                "{}/edgar/data/{}/{}-index.html",
                ARCHIVES_BASE,
                cik.unpadded(),
                acc_nodash
            ),
            primary_doc_url: format!(
                "{}/edgar/data/{}/{}/{}",
                ARCHIVES_BASE,
                cik.unpadded(),
                acc_nodash,
                primary_document
            ),
            accession_number: accession,
            filing_date: recent.filing_date.get(i).cloned().unwrap_or_default(),
            report_date: recent.report_date.get(i).cloned().unwrap_or_default(),
            acceptance_date_time: recent
                .acceptance_date_time
                .get(i)
                .cloned()
                .unwrap_or_default(),
            form: recent.form.get(i).cloned().unwrap_or_default(),
            items: recent.items.get(i).cloned().unwrap_or_default(),
            size: recent.size.get(i).copied().unwrap_or_default(),
            primary_document,
            primary_doc_description: recent
                .primary_doc_description
                .get(i)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Serialized field values, lowercased, for the free-text keyword filter.
    pub fn haystack(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_default()
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cik_pads_bare_digits() {
        assert_eq!(Cik::pad("1829311").unwrap().as_str(), "0001829311");
    }

    #[test]
    fn cik_strips_embedded_non_digits() {
        assert_eq!(Cik::pad("CIK-1829311").unwrap().as_str(), "0001829311");
    }

    #[test]
    fn cik_empty_input_is_none() {
        assert!(Cik::pad("").is_none());
        assert!(Cik::pad("no digits here").is_none());
    }

    #[test]
    fn cik_unpadded_strips_leading_zeros() {
        let cik = Cik::pad("0001829311").unwrap();
        assert_eq!(cik.unpadded(), "1829311");
        assert_eq!(Cik::from_number(0).unpadded(), "0");
    }

    #[test]
    fn ticker_lookup_is_case_insensitive() {
        let mut map = HashMap::new();
        map.insert(
            "0".to_string(),
            TickerEntry {
                cik_str: 1829311,
                ticker: "BMNR".to_string(),
                title: "Bitmine Immersion Technologies, Inc.".to_string(),
            },
        );
        let tickers = TickerMap::from_index_map(map);
        assert_eq!(tickers.cik_for("bmnr").unwrap().as_str(), "0001829311");
        assert!(tickers.cik_for("AAPL").is_none());
        assert!(tickers.cik_for("").is_none());
    }

    #[test]
    fn filing_entry_urls_use_unpadded_cik_and_dashless_accession() {
        let cik = Cik::pad("0001829311").unwrap();
        let recent = RecentFilings {
            accession_number: vec!["0001213900-25-000001".to_string()],
            filing_date: vec!["2025-07-01".to_string()],
            form: vec!["8-K".to_string()],
            primary_document: vec!["ea0001.htm".to_string()],
            ..Default::default()
        };
        let entry = FilingEntry::from_recent(&cik, &recent, 0).unwrap();
        assert_eq!(
            entry.index_url,
            "https://www.sec.gov/Archives/edgar/data/1829311/000121390025000001-index.html"
        );
        assert_eq!(
            entry.primary_doc_url,
            "https://www.sec.gov/Archives/edgar/data/1829311/000121390025000001/ea0001.htm"
        );
    }

    #[test]
    fn sparse_record_deserializes_to_empty_history() {
        let submission: CompanySubmission = serde_json::from_str(r#"{"name": "Test Co"}"#)
            .expect("sparse record should deserialize");
        assert!(submission.filings.recent.is_empty());
    }
}
