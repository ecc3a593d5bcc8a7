//! Toxicity scoring over the toxic-word list.
//!
//! Two independent passes over the same lower-cased text:
//! - substring pass: 0.20 per distinct toxic word found anywhere;
//! - token pass: +0.10 once if more than one whitespace token is exactly a toxic word.
//!
//! The passes can double count the same word. Result clamped to [0, 0.9].

use serde::Serialize;

use super::{matched_phrases, LEXICON};

pub const TOXICITY_SCORE_CAP: f64 = 0.9;

const KEYWORD_WEIGHT: f64 = 0.20;
const REPEAT_BONUS: f64 = 0.10;

const TOXIC_ABOVE: f64 = 0.6;
const UNSAFE_ABOVE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToxicityLabel {
    Safe,
    Unsafe,
    Toxic,
}

impl ToxicityLabel {
    /// `toxic` above 0.6, `unsafe` in (0.3, 0.6], otherwise `safe`.
    pub fn from_score(score: f64) -> Self {
        if score > TOXIC_ABOVE {
            Self::Toxic
        } else if score > UNSAFE_ABOVE {
            Self::Unsafe
        } else {
            Self::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Unsafe => "unsafe",
            Self::Toxic => "toxic",
        }
    }
}

/// Per-category scores over the fixed moderation category set.
/// `spam` and `misinformation` are never set by this scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryScores {
    pub safe: f64,
    pub spam: f64,
    pub toxic: f64,
    pub misinformation: f64,
    #[serde(rename = "unsafe")]
    pub unsafe_content: f64,
}

impl CategoryScores {
    fn for_score(score: f64, label: ToxicityLabel) -> Self {
        Self {
            safe: 1.0 - score,
            spam: 0.0,
            toxic: if label == ToxicityLabel::Toxic { score } else { 0.0 },
            misinformation: 0.0,
            unsafe_content: if label == ToxicityLabel::Unsafe {
                score
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToxicityAssessment {
    pub score: f64,
    pub matched_keywords: Vec<String>,
    pub label: ToxicityLabel,
    pub all_scores: CategoryScores,
    pub explain: Vec<String>,
}

pub fn score_toxicity(text: &str) -> ToxicityAssessment {
    let lowered = text.to_lowercase();
    let matched = matched_phrases(&lowered, &LEXICON.toxic);

    let mut score = matched.len() as f64 * KEYWORD_WEIGHT;

    let exact_tokens = lowered
        .split_whitespace()
        .filter(|tok| LEXICON.toxic.iter().any(|w| w == tok))
        .count();
    if exact_tokens > 1 {
        score += REPEAT_BONUS;
    }

    let score = score.clamp(0.0, TOXICITY_SCORE_CAP);
    let label = ToxicityLabel::from_score(score);

    let mut explain = Vec::new();
    if !matched.is_empty() {
        explain.push(format!("Found toxic language: {}", matched.join(", ")));
    }

    ToxicityAssessment {
        score,
        all_scores: CategoryScores::for_score(score, label),
        matched_keywords: matched,
        label,
        explain,
    }
}
