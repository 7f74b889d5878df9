//! Response analyzer.
//!
//! Pure heuristics that estimate the learner's sophistication from a single
//! answer and classify how quickly it was written. Results feed the tutor's
//! difficulty guidance; nothing here performs I/O.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Words that signal abstract or argumentative reasoning.
pub const CONCEPTUAL_TERMS: [&str; 9] = [
    "therefore",
    "however",
    "consequently",
    "furthermore",
    "nevertheless",
    "hypothesis",
    "theory",
    "concept",
    "analysis",
];

/// Minimum length, in letters or digits, of a "complex" word.
pub const COMPLEX_WORD_LENGTH: usize = 7;

/// Answers quicker than this are classified as fast.
pub const FAST_RESPONSE: Duration = Duration::from_secs(10);

/// Answers slower than this are classified as slow.
pub const SLOW_RESPONSE: Duration = Duration::from_secs(45);

static SENTENCE_TERMINATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

/// Heuristic learner sophistication.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum LearnerLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl LearnerLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearnerLevel::Beginner => "beginner",
            LearnerLevel::Intermediate => "intermediate",
            LearnerLevel::Advanced => "advanced",
        }
    }

    /// Applies a candidate level without ever moving down.
    pub fn ratchet(self, candidate: LearnerLevel) -> LearnerLevel {
        self.max(candidate)
    }
}

impl fmt::Display for LearnerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long the learner took to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseTiming {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl ResponseTiming {
    pub fn from_elapsed(elapsed: Duration) -> Self {
        if elapsed < FAST_RESPONSE {
            ResponseTiming::Fast
        } else if elapsed > SLOW_RESPONSE {
            ResponseTiming::Slow
        } else {
            ResponseTiming::Normal
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::from_elapsed(Duration::from_millis(millis))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseTiming::Fast => "fast",
            ResponseTiming::Normal => "normal",
            ResponseTiming::Slow => "slow",
        }
    }
}

impl fmt::Display for ResponseTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw counts and ratios computed from one answer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResponseMetrics {
    pub words: usize,
    pub complex_words: usize,
    pub sentences: usize,
    pub conceptual_terms: usize,
    pub avg_words_per_sentence: f64,
    pub complexity_ratio: f64,
    pub concept_ratio: f64,
}

impl ResponseMetrics {
    /// Computes metrics for `text`. Blank input yields all zeros with one sentence.
    pub fn measure(text: &str) -> Self {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let sentences = SENTENCE_TERMINATORS.find_iter(text).count().max(1);
        if tokens.is_empty() {
            return Self {
                sentences,
                ..Self::default()
            };
        }

        let mut complex_words = 0;
        let mut conceptual_terms = 0;
        for token in &tokens {
            let word = token.trim_matches(|c: char| !c.is_alphanumeric());
            if word.chars().filter(|c| c.is_alphanumeric()).count() >= COMPLEX_WORD_LENGTH {
                complex_words += 1;
            }
            let lower = word.to_lowercase();
            if CONCEPTUAL_TERMS.contains(&lower.as_str()) {
                conceptual_terms += 1;
            }
        }

        let words = tokens.len();
        let total = words as f64;
        Self {
            words,
            complex_words,
            sentences,
            conceptual_terms,
            avg_words_per_sentence: total / sentences as f64,
            complexity_ratio: complex_words as f64 / total,
            concept_ratio: conceptual_terms as f64 / total,
        }
    }

    /// Level suggested by these metrics alone.
    pub fn candidate_level(&self) -> LearnerLevel {
        if (self.avg_words_per_sentence > 15.0
            || self.complexity_ratio > 0.2
            || self.concept_ratio > 0.1)
            && self.words > 20
        {
            LearnerLevel::Advanced
        } else if (self.avg_words_per_sentence > 10.0
            || self.complexity_ratio > 0.15
            || self.concept_ratio > 0.05)
            && self.words > 10
        {
            LearnerLevel::Intermediate
        } else {
            LearnerLevel::Beginner
        }
    }
}

/// Result of analysing one answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseAnalysis {
    pub metrics: ResponseMetrics,
    pub candidate: LearnerLevel,
}

/// Analyses a learner's answer.
pub fn analyze(text: &str) -> ResponseAnalysis {
    let metrics = ResponseMetrics::measure(text);
    ResponseAnalysis {
        candidate: metrics.candidate_level(),
        metrics,
    }
}

/// Per-session, in-memory view of the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub level: LearnerLevel,
    pub timing: ResponseTiming,
}

impl LearnerProfile {
    /// Folds one answer into the profile: level ratchets, timing is replaced.
    pub fn observe(&mut self, text: &str, elapsed: Duration) -> ResponseAnalysis {
        let analysis = analyze(text);
        self.level = self.level.ratchet(analysis.candidate);
        self.timing = ResponseTiming::from_elapsed(elapsed);
        analysis
    }
}
