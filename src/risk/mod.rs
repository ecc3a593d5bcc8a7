// src/risk/mod.rs
//! Rule-based text risk scoring: spam and toxicity.
//!
//! Both scorers are pure functions of the input text. They share the embedded
//! keyword lexicon (`lexicon.json`) but never influence each other.

pub mod spam;
pub mod toxicity;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::telemetry::dev_log_event;

pub use crate::risk::spam::{score_spam, LabelProbs, SpamAssessment};
pub use crate::risk::toxicity::{score_toxicity, CategoryScores, ToxicityAssessment, ToxicityLabel};

/// Curated phrase lists, in match order.
#[derive(Debug, Clone, Deserialize)]
pub struct Lexicon {
    pub spam: Vec<String>,
    pub toxic: Vec<String>,
}

pub(crate) static LEXICON: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("lexicon.json");
    let lex = serde_json::from_str::<Lexicon>(raw).expect("valid risk lexicon");
    Lexicon {
        spam: clean_list(lex.spam),
        toxic: clean_list(lex.toxic),
    }
});

/// Lower-case, trim and drop empty/repeated entries while keeping list order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Every phrase of `phrases` that occurs in `lowered` as a plain substring.
/// No word-boundary check: "hell" matches inside "hello".
pub(crate) fn matched_phrases(lowered: &str, phrases: &[String]) -> Vec<String> {
    phrases
        .iter()
        .filter(|p| lowered.contains(p.as_str()))
        .cloned()
        .collect()
}

/// Combined output of both scorers for one text.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskReport {
    pub spam: SpamAssessment,
    pub toxicity: ToxicityAssessment,
}

#[derive(Debug, Clone, Default)]
pub struct RiskScorer;

impl RiskScorer {
    pub fn new() -> Self {
        Self
    }

    /// Runs both scorers independently over `text`.
    pub fn score_text(&self, text: &str) -> RiskReport {
        let spam = score_spam(text);
        let toxicity = score_toxicity(text);

        dev_log_event("spam", text, &spam.matched_keywords, spam.score);
        dev_log_event("toxicity", text, &toxicity.matched_keywords, toxicity.score);

        RiskReport { spam, toxicity }
    }
}
