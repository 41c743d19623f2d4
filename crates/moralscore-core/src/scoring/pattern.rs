//! Position-sensitive scoring.
//!
//! Bag-of-words with two local rules:
//!
//! | Rule | Trigger | Effect |
//! |------|---------|--------|
//! | Negation | `not`, `never`, `*n't`, ... | next `negation_window` tokens in the sentence flip eMFD sentiment sign and swap MFD virtue/vice |
//! | Intensifier | `very`, `deeply`, ... | next token's weight × `intensifier_weight` |
//!
//! Trigger words are never scored themselves.

use lazy_static::lazy_static;
use std::collections::HashSet;

use super::accumulator::Accumulator;
use super::ScoringStrategy;
use crate::lexicon::Lexicon;
use crate::tokenizer::Document;
use crate::types::{AnalysisOptions, ScoreRecord, ScoringMethod};

lazy_static! {
    static ref NEGATORS: HashSet<&'static str> = [
        "not", "no", "never", "cannot", "without", "nor", "neither", "none",
        "nobody", "nothing", "nowhere", "hardly", "barely", "scarcely",
    ]
    .into_iter()
    .collect();

    static ref INTENSIFIERS: HashSet<&'static str> = [
        "very", "deeply", "extremely", "highly", "really", "truly", "absolutely",
        "completely", "totally", "utterly", "incredibly", "profoundly", "so", "most",
    ]
    .into_iter()
    .collect();
}

/// True for negation cues, including any `n't` contraction.
pub fn is_negator(word: &str) -> bool {
    NEGATORS.contains(word) || word.ends_with("n't")
}

pub fn is_intensifier(word: &str) -> bool {
    INTENSIFIERS.contains(word)
}

/// Negation- and intensifier-aware bag-of-words.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternStrategy;

impl ScoringStrategy for PatternStrategy {
    fn method(&self) -> ScoringMethod {
        ScoringMethod::Pattern
    }

    fn score(&self, document: &Document, lexicon: &Lexicon, options: &AnalysisOptions) -> ScoreRecord {
        let params = &options.params;
        let mut acc = Accumulator::new(options);

        let mut sentence = usize::MAX;
        let mut scope = 0usize;
        let mut boost: Option<f64> = None;

        for token in document.tokens() {
            if token.sentence != sentence {
                sentence = token.sentence;
                scope = 0;
                boost = None;
            }

            if is_negator(&token.text) {
                scope = params.negation_window;
                boost = None;
                continue;
            }
            if is_intensifier(&token.text) {
                boost = Some(params.intensifier_weight);
                continue;
            }

            let negated = scope > 0;
            scope = scope.saturating_sub(1);
            let weight = boost.take().unwrap_or(1.0);

            if let Some(entry) = lexicon.lookup_token(token) {
                acc.add(entry, weight, negated, 1);
            }
        }

        acc.finish(document.len())
    }
}
