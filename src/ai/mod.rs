// src/ai/mod.rs
//
// Optional AI summarizer. An external text-in/text-out collaborator: given a
// filing excerpt it returns a one-paragraph narrative summary, or nothing.
// "Nothing" is routine (no credential, quota, rate limit, network trouble)
// and is modeled as None, never as an error - callers fall back to the
// rule-based paragraph.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// Excerpt budget sent to the model.
pub const EXCERPT_CHARS: usize = 6_000;
/// Small general-purpose default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct AiSummarizer {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl AiSummarizer {
    /// A missing or blank credential disables the AI path entirely, without
    /// error.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> AiSummarizer {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        AiSummarizer {
            http: reqwest::Client::new(),
            api_key,
            model: model.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The bounded slice of document text handed to the model.
    pub fn excerpt_of(text: &str) -> String {
        text.chars().take(EXCERPT_CHARS).collect()
    }

    /// Cache key for a summary: accession, model, excerpt digest and a
    /// credential fingerprint. A different credential or model never serves
    /// a result computed under another one, and rotating the credential
    /// naturally invalidates whatever the old one produced.
    pub fn cache_key(&self, accession: &str, excerpt: &str) -> String {
        let credential = match &self.api_key {
            Some(key) => format!("{:016x}", hash64(key)),
            None => "anon".to_string(),
        };
        format!(
            "{}|{}|{:016x}|{}",
            accession,
            self.model,
            hash64(excerpt),
            credential
        )
    }

    /// Requests a one-paragraph summary of a filing excerpt. Returns None on
    /// every failure mode; the reason is logged at debug level for
    /// diagnostics.
    pub async fn one_paragraph(
        &self,
        accession: &str,
        form: &str,
        excerpt: &str,
    ) -> Option<String> {
        let key = self.api_key.as_deref()?;

        match self.request_summary(key, form, excerpt).await {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => {
                tracing::debug!("AI summary for {} came back empty", accession);
                None
            }
            Err(e) => {
                tracing::debug!("AI summary for {} skipped: {}", accession, e);
                None
            }
        }
    }

    async fn request_summary(
        &self,
        key: &str,
        form: &str,
        excerpt: &str,
    ) -> Result<String, reqwest::Error> {
        let prompt = format!(
            "You are an equity research assistant. Read the SEC filing excerpt below and write:\n\
             - A one-line headline.\n\
             - 3–6 bullet points covering material items (financing like ATM/PIPE/warrants, \
             buybacks, guidance, M&A, crypto holdings, and any Item references).\n\
             - Keep it factual, concise, and neutral.\n\n\
             Form: {}\n\n\
             Filing excerpt (may be partial):\n{}\n",
            form, excerpt
        );

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "Be terse, precise, and neutral. Avoid speculation."},
                {"role": "user", "content": prompt},
            ],
            "temperature": 0.2,
            "max_tokens": 600,
        });

        let response = self
            .http
            .post(COMPLETIONS_URL)
            .bearer_auth(key)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let value: serde_json::Value = response.json().await?;
        let content = value
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        Ok(content.trim().to_string())
    }
}

fn hash64(s: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credential_yields_none_without_erroring() {
        let ai = AiSummarizer::new(None, DEFAULT_MODEL);
        assert!(!ai.is_enabled());
        let result = ai.one_paragraph("0001-25-000001", "8-K", "some excerpt").await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn blank_credential_counts_as_missing() {
        let ai = AiSummarizer::new(Some("   ".to_string()), DEFAULT_MODEL);
        assert!(!ai.is_enabled());
        assert_eq!(ai.one_paragraph("acc", "8-K", "text").await, None);
    }

    #[test]
    fn excerpt_is_char_bounded() {
        let text = "é".repeat(EXCERPT_CHARS + 100);
        assert_eq!(AiSummarizer::excerpt_of(&text).chars().count(), EXCERPT_CHARS);
    }

    #[test]
    fn cache_key_tracks_model_credential_and_excerpt() {
        let a = AiSummarizer::new(Some("sk-one".to_string()), "gpt-4o-mini");
        let b = AiSummarizer::new(Some("sk-two".to_string()), "gpt-4o-mini");
        let c = AiSummarizer::new(Some("sk-one".to_string()), "gpt-4o");

        let key_a = a.cache_key("acc-1", "excerpt");
        assert_eq!(key_a, a.cache_key("acc-1", "excerpt"));
        assert_ne!(key_a, b.cache_key("acc-1", "excerpt"));
        assert_ne!(key_a, c.cache_key("acc-1", "excerpt"));
        assert_ne!(key_a, a.cache_key("acc-1", "different excerpt"));
        assert_ne!(key_a, a.cache_key("acc-2", "excerpt"));
    }

    #[test]
    fn cache_key_never_embeds_the_raw_credential() {
        let ai = AiSummarizer::new(Some("sk-supersecret".to_string()), DEFAULT_MODEL);
        assert!(!ai.cache_key("acc", "excerpt").contains("sk-supersecret"));
    }
}
