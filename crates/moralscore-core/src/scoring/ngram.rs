//! Greedy longest-first phrase matching.

use super::accumulator::Accumulator;
use super::ScoringStrategy;
use crate::lexicon::{Entry, Lexicon};
use crate::tokenizer::{Document, Token};
use crate::types::{AnalysisOptions, ScoreRecord, ScoringMethod};

/// Slides over the document trying the longest lexicon phrase first.
///
/// A matched phrase consumes its tokens and contributes one observation.
/// Phrases never span a sentence break.
#[derive(Debug, Clone, Copy, Default)]
pub struct NgramStrategy;

impl NgramStrategy {
    fn longest_match<'l>(
        tokens: &[Token],
        start: usize,
        lexicon: &'l Lexicon,
    ) -> Option<(Entry<'l>, usize)> {
        let sentence = tokens[start].sentence;
        let available = tokens[start..]
            .iter()
            .take_while(|t| t.sentence == sentence)
            .count();
        let longest = lexicon.max_phrase_len().min(available);

        for n in (2..=longest).rev() {
            let phrase = tokens[start..start + n]
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(entry) = lexicon.lookup(&phrase) {
                return Some((entry, n));
            }
        }

        lexicon.lookup_token(&tokens[start]).map(|entry| (entry, 1))
    }
}

impl ScoringStrategy for NgramStrategy {
    fn method(&self) -> ScoringMethod {
        ScoringMethod::Ngram
    }

    fn score(&self, document: &Document, lexicon: &Lexicon, options: &AnalysisOptions) -> ScoreRecord {
        let tokens = document.tokens();
        let mut acc = Accumulator::new(options);
        let mut i = 0;
        while i < tokens.len() {
            match Self::longest_match(tokens, i, lexicon) {
                Some((entry, n)) => {
                    acc.add(entry, 1.0, false, n);
                    i += n;
                }
                None => i += 1,
            }
        }
        acc.finish(tokens.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::load_builtin;
    use crate::tokenizer::tokenize;
    use crate::types::{DictionaryKind, MORAL_NONMORAL_RATIO};

    fn run(text: &str, options: &AnalysisOptions) -> ScoreRecord {
        let lexicon = load_builtin(options.dictionary).unwrap();
        NgramStrategy.score(&tokenize(text).unwrap(), &lexicon, options)
    }

    #[test]
    fn test_phrase_wins_over_its_words() {
        let record = run("human rights", &AnalysisOptions::default());
        assert!((record.get("fairness_p").unwrap() - 0.36).abs() < 1e-12);
        assert!((record.get("care_p").unwrap() - 0.15).abs() < 1e-12);
        // both tokens consumed by one observation
        assert_eq!(record.get(MORAL_NONMORAL_RATIO), Some(2.0));
    }

    #[test]
    fn test_phrase_does_not_cross_sentence_break() {
        let record = run("human. rights", &AnalysisOptions::default());
        assert!((record.get("fairness_p").unwrap() - 0.29).abs() < 1e-12);
        assert_eq!(record.get(MORAL_NONMORAL_RATIO), Some(1.0));
    }

    #[test]
    fn test_three_token_phrase_in_categorical_lexicon() {
        let options = AnalysisOptions::new(DictionaryKind::Mfd2);
        let record = run("we defend the rule of law", &options);
        assert!(record.get("authority.virtue").unwrap() > 0.0);
        // 3 of 6 tokens matched by the phrase
        assert_eq!(record.get(MORAL_NONMORAL_RATIO), Some(1.0));
    }

    #[test]
    fn test_single_words_still_match() {
        let record = run("justice for all", &AnalysisOptions::default());
        assert!((record.get("fairness_p").unwrap() - 0.33).abs() < 1e-12);
    }
}
