// src/classifier/mod.rs
//
// Rule-based filing classifier: keyword-category detection over a bounded
// prefix of the document text, a signed impact score, and a templated
// headline with supporting signal bullets. Pure and total - any (form, text)
// pair classifies, including empty text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Scanning window over the document text. Headline items appear early in
/// structured filings, so the prefix carries most of the signal; the bound
/// also keeps classification cost independent of document size.
pub const SCAN_WINDOW_CHARS: usize = 4_000;

// --- Keyword-category patterns (Lazy Static) ---
static FINANCING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)ATM|at-the-market|equity offering|registered direct|PIPE|warrant|convertible|shelf registration|S-3|ASR|capital raise")
        .expect("Failed to compile FINANCING_RE")
});

static INSIDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Form 4|beneficial owner|officer|director|grant|option|restricted stock|RSU")
        .expect("Failed to compile INSIDER_RE")
});

static CRYPTO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Bitcoin|BTC|Ethereum|ETH|hashrate|miners|mining|immersion|wallet|custody")
        .expect("Failed to compile CRYPTO_RE")
});

static BUYBACK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)repurchase|buyback|issuer repurchases|ASC 505-30")
        .expect("Failed to compile BUYBACK_RE")
});

static GUIDANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)outlook|guidance|reaffirm|update|forward-looking")
        .expect("Failed to compile GUIDANCE_RE")
});

static MATERIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Item\s*1\.01|Material Definitive Agreement|Item\s*2\.01|acquisition|disposition|Item\s*3\.02|unregistered|Item\s*5\.02|departure|appointment|Item\s*5\.07|shareholder|vote")
        .expect("Failed to compile MATERIAL_RE")
});

/// Categorical impact of a filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Impact::Positive => "Positive",
            Impact::Neutral => "Neutral",
            Impact::Negative => "Negative",
        })
    }
}

/// Boolean hit per keyword category. Impact is a deterministic function of
/// these six booleans and the fixed weights - no hidden state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalHits {
    pub financing: bool,
    pub insider: bool,
    pub crypto: bool,
    pub buyback: bool,
    pub guidance: bool,
    pub material: bool,
}

impl SignalHits {
    /// Tests each category pattern against the scanning window.
    pub fn scan(window: &str) -> SignalHits {
        SignalHits {
            financing: FINANCING_RE.is_match(window),
            insider: INSIDER_RE.is_match(window),
            crypto: CRYPTO_RE.is_match(window),
            buyback: BUYBACK_RE.is_match(window),
            guidance: GUIDANCE_RE.is_match(window),
            material: MATERIAL_RE.is_match(window),
        }
    }

    /// Fixed scoring weights: buyback +2, financing -2, material +1.
    /// Insider, crypto and guidance are informational only.
    pub fn score(&self) -> i32 {
        let mut score = 0;
        if self.buyback {
            score += 2;
        }
        if self.financing {
            score -= 2;
        }
        if self.material {
            score += 1;
        }
        score
    }

    pub fn impact(&self) -> Impact {
        let score = self.score();
        if score >= 2 {
            Impact::Positive
        } else if score <= -2 {
            Impact::Negative
        } else {
            Impact::Neutral
        }
    }

    /// Category name -> hit, in the fixed category order.
    pub fn iter(&self) -> [(&'static str, bool); 6] {
        [
            ("financing", self.financing),
            ("insider", self.insider),
            ("crypto", self.crypto),
            ("buyback", self.buyback),
            ("guidance", self.guidance),
            ("material", self.material),
        ]
    }
}

/// Derived classification of a single filing. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub impact: Impact,
    pub headline: String,
    pub bullets: Vec<String>,
    pub hits: SignalHits,
}

impl Classification {
    /// Headline plus bullet lines - the fallback body when no AI summary is
    /// available.
    pub fn to_paragraph(&self) -> String {
        if self.bullets.is_empty() {
            return self.headline.clone();
        }
        let mut out = self.headline.clone();
        out.push_str("\nSignals detected:");
        for bullet in &self.bullets {
            out.push_str("\n- ");
            out.push_str(bullet);
        }
        out
    }
}

/// Classifies a filing from its form type and document text.
///
/// The headline tail is chosen by fixed priority (buyback > financing >
/// material > insider > none), independent of the numeric score, so a
/// filing hitting both buyback and financing is headlined "buyback
/// mentioned" while netting to Neutral. The asymmetry is deliberate; callers
/// depend on the headline wording staying stable.
pub fn classify(form: &str, text: &str) -> Classification {
    let window: String = text.chars().take(SCAN_WINDOW_CHARS).collect();
    let hits = SignalHits::scan(&window);
    let impact = hits.impact();

    let mut bullets = Vec::new();
    if hits.material {
        bullets.push("Material item(s) indicated (e.g., Item 1.01/2.01/5.02/5.07).".to_string());
    }
    if hits.financing {
        bullets.push(
            "Financing activity detected (ATM/PIPE/warrants/shelf). Potential dilution risk."
                .to_string(),
        );
    }
    if hits.buyback {
        bullets.push("Repurchase/buyback language detected.".to_string());
    }
    if hits.insider {
        bullets.push("Insider/beneficial ownership or equity grants referenced.".to_string());
    }
    if hits.crypto {
        bullets.push("Crypto/mining references present (BTC/ETH/hashrate).".to_string());
    }
    if hits.guidance {
        bullets.push("Guidance/outlook language present.".to_string());
    }

    let tail = if hits.buyback {
        "buyback mentioned"
    } else if hits.financing {
        "financing/dilution signals"
    } else if hits.material {
        "material agreement or event"
    } else if hits.insider {
        "insider/ownership update"
    } else {
        "no strong signal"
    };
    let headline = format!("{}: {} — {}", form, impact, tail);

    Classification {
        impact,
        headline,
        bullets,
        hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buyback_alone_is_positive() {
        let c = classify("8-K", "The board approved a common stock repurchase plan.");
        assert_eq!(c.hits.buyback, true);
        assert_eq!(c.hits.financing, false);
        assert_eq!(c.hits.score(), 2);
        assert_eq!(c.impact, Impact::Positive);
        assert!(c.headline.ends_with("buyback mentioned"));
    }

    #[test]
    fn financing_alone_is_negative() {
        let c = classify("8-K", "Announced an at-the-market equity offering.");
        assert_eq!(c.hits.financing, true);
        assert_eq!(c.hits.score(), -2);
        assert_eq!(c.impact, Impact::Negative);
        assert!(c.headline.ends_with("financing/dilution signals"));
    }

    #[test]
    fn buyback_and_financing_net_to_neutral_but_headline_stays_buyback() {
        let c = classify("8-K", "A warrant exercise alongside a buyback plan.");
        assert!(c.hits.buyback && c.hits.financing);
        assert_eq!(c.hits.score(), 0);
        assert_eq!(c.impact, Impact::Neutral);
        // Headline priority is independent of the score.
        assert!(c.headline.ends_with("buyback mentioned"));
    }

    #[test]
    fn material_alone_scores_one_and_stays_neutral() {
        let c = classify("8-K", "Item 1.01 Material Definitive Agreement entered.");
        assert_eq!(c.hits.material, true);
        assert_eq!(c.hits.score(), 1);
        assert_eq!(c.impact, Impact::Neutral);
        assert!(c.headline.ends_with("material agreement or event"));
    }

    #[test]
    fn no_hits_is_neutral_with_no_bullets() {
        let c = classify("10-Q", "The quick brown fox jumps.");
        assert_eq!(c.hits, SignalHits::default());
        assert_eq!(c.impact, Impact::Neutral);
        assert!(c.headline.ends_with("no strong signal"));
        assert!(c.bullets.is_empty());
        assert_eq!(c.headline, "10-Q: Neutral — no strong signal");
    }

    #[test]
    fn insider_headline_when_nothing_stronger_hits() {
        let c = classify("4", "Form 4 filed by an officer.");
        assert!(c.hits.insider);
        assert_eq!(c.impact, Impact::Neutral);
        assert!(c.headline.ends_with("insider/ownership update"));
    }

    #[test]
    fn informational_categories_bullet_without_scoring() {
        let c = classify("8-K", "Treasury now holds Bitcoin and Ethereum.");
        assert!(c.hits.crypto);
        assert_eq!(c.hits.score(), 0);
        assert_eq!(c.impact, Impact::Neutral);
        assert!(c.bullets.iter().any(|b| b.contains("Crypto/mining")));
    }

    #[test]
    fn signal_past_the_scan_window_is_ignored() {
        let mut text = "x ".repeat(SCAN_WINDOW_CHARS / 2);
        text.push_str("buyback");
        let c = classify("8-K", &text);
        assert!(!c.hits.buyback);
        assert!(c.headline.ends_with("no strong signal"));

        let in_window = format!("buyback {}", "x ".repeat(SCAN_WINDOW_CHARS / 2));
        assert!(classify("8-K", &in_window).hits.buyback);
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "Item 5.02 departure of director; warrant issuance; repurchase plan.";
        assert_eq!(classify("8-K", text), classify("8-K", text));
    }

    #[test]
    fn empty_text_classifies_without_panic() {
        let c = classify("8-K", "");
        assert_eq!(c.impact, Impact::Neutral);
        assert!(c.bullets.is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let c = classify("8-K", "BUYBACK authorized.");
        assert!(c.hits.buyback);
    }

    #[test]
    fn paragraph_renders_headline_and_bullets() {
        let c = classify("8-K", "Stock repurchase authorized.");
        let p = c.to_paragraph();
        assert!(p.starts_with(&c.headline));
        assert!(p.contains("Repurchase/buyback language detected."));

        let quiet = classify("10-K", "nothing of note");
        assert_eq!(quiet.to_paragraph(), quiet.headline);
    }
}
