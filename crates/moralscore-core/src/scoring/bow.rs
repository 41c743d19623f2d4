//! Bag-of-words scoring.

use super::accumulator::Accumulator;
use super::ScoringStrategy;
use crate::lexicon::Lexicon;
use crate::tokenizer::Document;
use crate::types::{AnalysisOptions, ScoreRecord, ScoringMethod};

/// Every token found in the lexicon counts once with unit weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct BowStrategy;

impl ScoringStrategy for BowStrategy {
    fn method(&self) -> ScoringMethod {
        ScoringMethod::Bow
    }

    fn score(&self, document: &Document, lexicon: &Lexicon, options: &AnalysisOptions) -> ScoreRecord {
        let mut acc = Accumulator::new(options);
        for token in document.tokens() {
            if let Some(entry) = lexicon.lookup_token(token) {
                acc.add(entry, 1.0, false, 1);
            }
        }
        acc.finish(document.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::load_builtin;
    use crate::tokenizer::{tokenize, Tokenizer};
    use crate::types::{DictionaryKind, MORAL_NONMORAL_RATIO};

    #[test]
    fn test_repeated_word_weights_the_mean() {
        let lexicon = load_builtin(DictionaryKind::Emfd).unwrap();
        let options = AnalysisOptions::default();
        let once = BowStrategy.score(&tokenize("justice authority").unwrap(), &lexicon, &options);
        let twice = BowStrategy.score(
            &tokenize("justice justice authority").unwrap(),
            &lexicon,
            &options,
        );
        assert!(twice.get("fairness_p").unwrap() > once.get("fairness_p").unwrap());
    }

    #[test]
    fn test_phrase_entries_are_ignored() {
        let lexicon = load_builtin(DictionaryKind::Emfd).unwrap();
        let record = BowStrategy.score(
            &tokenize("human rights").unwrap(),
            &lexicon,
            &AnalysisOptions::default(),
        );
        // only "rights" matches on its own
        assert!((record.get("fairness_p").unwrap() - 0.29).abs() < 1e-12);
        assert_eq!(record.get(MORAL_NONMORAL_RATIO), Some(1.0));
    }

    #[test]
    fn test_mfd_counts_over_all_tokens() {
        let lexicon = load_builtin(DictionaryKind::Mfd2).unwrap();
        let doc = tokenize("the fair judge and the table").unwrap();
        let record = BowStrategy.score(&doc, &lexicon, &AnalysisOptions::new(DictionaryKind::Mfd2));
        assert!((record.get("fairness.virtue").unwrap() - 1.0 / 6.0).abs() < 1e-12);
        assert!((record.get("authority.virtue").unwrap() - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(record.get(MORAL_NONMORAL_RATIO), Some(0.5));
    }

    #[test]
    fn test_lemma_used_only_when_enabled() {
        let lexicon = load_builtin(DictionaryKind::Emfd).unwrap();
        let options = AnalysisOptions::default();
        let plain = BowStrategy.score(&tokenize("betrayed").unwrap(), &lexicon, &options);
        assert_eq!(plain.get(MORAL_NONMORAL_RATIO), Some(0.0));

        let doc = Tokenizer::for_options(true).tokenize("betrayed").unwrap();
        let lemmatized = BowStrategy.score(&doc, &lexicon, &options);
        assert!(lemmatized.get("loyalty_p").unwrap() > 0.3);
    }
}
