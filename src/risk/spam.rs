//! Spam scoring: curated phrase hits plus a few surface patterns.
//!
//! score = 0.15 * distinct phrase hits
//!       + 0.10 if more than one phrase hit
//!       + 0.20 long digit run (phone/account numbers)
//!       + 0.15 numeric amount followed by a money word
//!       + 0.10 more than two '!'
//!       + 0.10 ALL CAPS and longer than 10 chars
//! clamped to [0, 0.95].

use once_cell::sync::Lazy;
use regex::Regex;

use super::{matched_phrases, LEXICON};

pub const SPAM_SCORE_CAP: f64 = 0.95;

const KEYWORD_WEIGHT: f64 = 0.15;
const MULTI_KEYWORD_BONUS: f64 = 0.10;
const LONG_NUMBER_BONUS: f64 = 0.20;
const MONEY_AMOUNT_BONUS: f64 = 0.15;
const EXCLAMATION_BONUS: f64 = 0.10;
const SHOUTING_BONUS: f64 = 0.10;

/// Above this score a confidence line is added to the explanations.
const CONFIDENCE_EXPLAIN_THRESHOLD: f64 = 0.3;
const EXPLAIN_KEYWORDS_MAX: usize = 3;

static RE_LONG_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{10,}\b").expect("long number regex"));

// Runs on the raw text, so money words only count in lower case.
static RE_MONEY_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d+\$?\d*\b.*\b(?:dollar|usd|money|cash|prize)\b").expect("money amount regex")
});

/// Two-sided probability view of the spam score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelProbs {
    pub spam: f64,
    pub not_spam: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpamAssessment {
    pub score: f64,
    /// Matched phrases in lexicon order, each at most once.
    pub matched_keywords: Vec<String>,
    pub label_probs: LabelProbs,
    pub explain: Vec<String>,
}

impl SpamAssessment {
    pub fn rule_triggered(&self) -> bool {
        !self.matched_keywords.is_empty()
    }
}

pub fn score_spam(text: &str) -> SpamAssessment {
    let lowered = text.to_lowercase();
    let matched = matched_phrases(&lowered, &LEXICON.spam);

    let mut score = matched.len() as f64 * KEYWORD_WEIGHT;
    if matched.len() > 1 {
        score += MULTI_KEYWORD_BONUS;
    }
    if RE_LONG_NUMBER.is_match(text) {
        score += LONG_NUMBER_BONUS;
    }
    if RE_MONEY_AMOUNT.is_match(text) {
        score += MONEY_AMOUNT_BONUS;
    }
    if text.matches('!').count() > 2 {
        score += EXCLAMATION_BONUS;
    }
    if is_shouting(text) && text.chars().count() > 10 {
        score += SHOUTING_BONUS;
    }
    let score = score.clamp(0.0, SPAM_SCORE_CAP);

    let mut explain = Vec::new();
    if !matched.is_empty() {
        let head: Vec<&str> = matched
            .iter()
            .take(EXPLAIN_KEYWORDS_MAX)
            .map(String::as_str)
            .collect();
        explain.push(format!(
            "Found {} spam indicators: {}",
            matched.len(),
            head.join(", ")
        ));
    }
    if score > CONFIDENCE_EXPLAIN_THRESHOLD {
        explain.push(format!("Spam confidence: {score:.2}"));
    }

    SpamAssessment {
        score,
        matched_keywords: matched,
        label_probs: LabelProbs {
            spam: score,
            not_spam: 1.0 - score,
        },
        explain,
    }
}

/// At least one cased character and no lower-case ones.
fn is_shouting(text: &str) -> bool {
    let mut has_upper = false;
    for ch in text.chars() {
        if ch.is_lowercase() {
            return false;
        }
        has_upper |= ch.is_uppercase();
    }
    has_upper
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn shouted_promo_scores_high() {
        let s = score_spam("FREE MONEY!!! CLAIM REWARD NOW!!!");
        assert!(s.score > 0.5, "score = {}", s.score);
        assert!(s.matched_keywords.contains(&"free money".to_string()));
        assert!(s.matched_keywords.contains(&"claim reward".to_string()));
        // 2 * 0.15 + 0.10 + 0.10 ('!') + 0.10 (caps)
        assert!(approx(s.score, 0.6));
    }

    #[test]
    fn plain_greeting_scores_zero() {
        let s = score_spam("hello there, how are you");
        assert_eq!(s.score, 0.0);
        assert!(s.matched_keywords.is_empty());
        assert!(s.explain.is_empty());
        assert!(!s.rule_triggered());
        assert_eq!(s.label_probs.not_spam, 1.0);
    }

    #[test]
    fn empty_text_is_zero() {
        let s = score_spam("");
        assert_eq!(s.score, 0.0);
        assert!(s.explain.is_empty());
    }

    #[test]
    fn single_keyword_has_no_multi_bonus() {
        let s = score_spam("please click here");
        assert_eq!(s.matched_keywords, vec!["click here"]);
        assert!(approx(s.score, 0.15));
        assert_eq!(s.explain, vec!["Found 1 spam indicators: click here"]);
    }

    #[test]
    fn keywords_follow_lexicon_order_not_text_order() {
        let s = score_spam("click here to get free money");
        assert_eq!(s.matched_keywords, vec!["free money", "click here"]);
    }

    #[test]
    fn repeated_phrase_counts_once() {
        let s = score_spam("act now, act now, act now");
        assert_eq!(s.matched_keywords, vec!["act now"]);
        assert!(approx(s.score, 0.15));
    }

    #[test]
    fn long_digit_run_adds_bonus() {
        let s = score_spam("call me at 5551234567 tonight");
        assert!(approx(s.score, 0.20));
        let short = score_spam("call me at 555123 tonight");
        assert_eq!(short.score, 0.0);
    }

    #[test]
    fn digit_run_inside_word_is_ignored() {
        let s = score_spam("ref abc1234567890 ok");
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn money_amount_needs_money_word_later() {
        let s = score_spam("send 500 usd today");
        assert!(approx(s.score, 0.15));
        let before = score_spam("usd send 500 today");
        assert_eq!(before.score, 0.0);
    }

    #[test]
    fn money_word_is_case_sensitive() {
        let s = score_spam("send 500 USD today");
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn exclamations_need_more_than_two() {
        assert_eq!(score_spam("wow!!").score, 0.0);
        assert!(approx(score_spam("wow!!!").score, 0.10));
    }

    #[test]
    fn caps_bonus_needs_length_over_ten() {
        assert!(approx(score_spam("HELLO WORLD").score, 0.10));
        assert_eq!(score_spam("HELLO").score, 0.0);
        assert_eq!(score_spam("1234 5678 90!").score, 0.0);
    }

    #[test]
    fn score_is_capped() {
        let text = "FREE MONEY WIN PRIZE CLAIM REWARD INSTANT CASH ACT NOW CLICK HERE \
                    CALL 12345678901 FOR 100 DOLLARS!!!";
        let s = score_spam(text);
        assert_eq!(s.score, SPAM_SCORE_CAP);
        assert_eq!(s.label_probs.spam + s.label_probs.not_spam, 1.0);
    }

    #[test]
    fn explanations_list_first_three_and_confidence() {
        let s = score_spam("free money, win prize, claim reward, instant cash");
        assert_eq!(s.matched_keywords.len(), 4);
        assert_eq!(
            s.explain,
            vec![
                "Found 4 spam indicators: free money, win prize, claim reward".to_string(),
                "Spam confidence: 0.70".to_string(),
            ]
        );
    }
}
