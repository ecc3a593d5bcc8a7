//! Consolidation of raw recommender output into a ranked top-K list.
//!
//! Pipeline: filter invalid scores -> dedup by `item_id` -> stable sort by
//! score (descending) -> truncate to K -> assign 1-based ranks.
//! Never fails; malformed candidates are dropped, not rejected.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_TOP_K: usize = 10;

/// One scored item as produced upstream. Unknown fields are carried through
/// untouched in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub item_id: Value,
    #[serde(default)]
    pub score: Value,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Candidate {
    pub fn new(item_id: impl Into<Value>, score: impl Into<Value>) -> Self {
        Self {
            item_id: item_id.into(),
            score: score.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Finite numeric score strictly above zero; anything else is invalid.
    pub fn valid_score(&self) -> Option<f64> {
        self.score.as_f64().filter(|s| s.is_finite() && *s > 0.0)
    }

    /// Identity used for dedup. Numbers key on their value (`1` == `1.0`);
    /// everything else on its JSON text, which keeps `"1"` and `1` apart.
    fn dedup_key(&self) -> Option<String> {
        match &self.item_id {
            Value::Null => None,
            Value::Number(n) => match n.as_f64() {
                Some(f) => Some(format!("{f}")),
                None => Some(n.to_string()),
            },
            id => Some(id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub rank: usize,
}

/// Which candidate survives when an `item_id` repeats within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The first-seen candidate always wins, even against a later higher score.
    #[default]
    FirstSeen,
    /// A later duplicate replaces the kept one only with a strictly greater
    /// score; exact ties keep the first-seen candidate.
    KeepHighest,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_seen" | "first-seen" => Ok(Self::FirstSeen),
            "keep_highest" | "keep-highest" => Ok(Self::KeepHighest),
            other => Err(format!("unknown duplicate policy: {other}")),
        }
    }
}

pub fn consolidate(
    candidates: Vec<Candidate>,
    k: usize,
    policy: DuplicatePolicy,
) -> Vec<RankedCandidate> {
    // (candidate, score) in first-seen order; `slots` maps id -> position.
    let mut kept: Vec<(Candidate, f64)> = Vec::with_capacity(candidates.len());
    let mut slots: HashMap<String, usize> = HashMap::new();

    for cand in candidates {
        let (Some(score), Some(key)) = (cand.valid_score(), cand.dedup_key()) else {
            continue;
        };
        match slots.get(&key) {
            None => {
                slots.insert(key, kept.len());
                kept.push((cand, score));
            }
            Some(&slot) => {
                if policy == DuplicatePolicy::KeepHighest && score > kept[slot].1 {
                    kept[slot] = (cand, score);
                }
            }
        }
    }

    // `sort_by` is stable: equal scores keep arrival order.
    kept.sort_by(|a, b| b.1.total_cmp(&a.1));

    kept.into_iter()
        .take(k)
        .enumerate()
        .map(|(idx, (mut candidate, _))| {
            candidate.metadata.remove("rank");
            RankedCandidate {
                candidate,
                rank: idx + 1,
            }
        })
        .collect()
}
