//! Aggregation strategies that turn a [`Document`] into a [`ScoreRecord`].
//!
//! Each strategy walks the document once against a shared, read-only
//! [`Lexicon`] and evaluates independently of the others.
//!
//! | Method | Observation | Weighting |
//! |--------|-------------|-----------|
//! | `bow` | every token found in the lexicon | 1.0 |
//! | `wordlist` | distinct lexicon words | binary presence |
//! | `ngram` | greedy longest-first phrases | 1.0 per phrase |
//! | `pattern` | every token, negation-scoped | intensifier-scaled |
//!
//! eMFD records are weighted means over matched observations; MFD and MFD2
//! records are weighted category frequencies over all document tokens.

mod accumulator;
mod bow;
mod ngram;
mod pattern;
mod wordlist;

pub use bow::BowStrategy;
pub use ngram::NgramStrategy;
pub use pattern::{is_intensifier, is_negator, PatternStrategy};
pub use wordlist::WordlistStrategy;

use crate::lexicon::Lexicon;
use crate::tokenizer::Document;
use crate::types::{AnalysisOptions, ScoreRecord, ScoringMethod};
use crate::AnalysisError;

/// Trait implemented by all scoring methods.
pub trait ScoringStrategy {
    /// The method this strategy implements.
    fn method(&self) -> ScoringMethod;

    /// Score a non-empty document.
    ///
    /// Options have already been validated and the lexicon matches
    /// `options.dictionary`. Never fails: zero matches give an all-zero record.
    fn score(&self, document: &Document, lexicon: &Lexicon, options: &AnalysisOptions) -> ScoreRecord;
}

/// The strategy for `method`.
pub fn strategy_for(method: ScoringMethod) -> &'static dyn ScoringStrategy {
    match method {
        ScoringMethod::Bow => &BowStrategy,
        ScoringMethod::Wordlist => &WordlistStrategy,
        ScoringMethod::Ngram => &NgramStrategy,
        ScoringMethod::Pattern => &PatternStrategy,
    }
}

/// Score `document` against `lexicon`.
///
/// Fails with `UnsupportedMethod` for option combinations the dictionary
/// cannot honor and with `Configuration` when the lexicon is of a different
/// kind than `options.dictionary`.
pub fn score(
    document: &Document,
    lexicon: &Lexicon,
    options: &AnalysisOptions,
) -> Result<ScoreRecord, AnalysisError> {
    options.validate()?;

    if lexicon.kind() != options.dictionary {
        return Err(AnalysisError::Configuration(format!(
            "lexicon '{}' is {}, but {} was requested",
            lexicon.source(),
            lexicon.kind(),
            options.dictionary
        )));
    }

    if document.is_empty() {
        return Ok(ScoreRecord::zeroed(options.layout()));
    }

    let strategy = strategy_for(options.method);
    let record = strategy.score(document, lexicon, options);

    tracing::debug!(
        dictionary = %options.dictionary,
        method = %strategy.method(),
        tokens = document.len(),
        ratio = record.moral_nonmoral_ratio().unwrap_or_default(),
        "Document scored"
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::load_builtin;
    use crate::tokenizer::tokenize;
    use crate::types::{DictionaryKind, MappingMode, MetricLayout, MORAL_NONMORAL_RATIO};

    const COURTROOM: &str = "The judge delivered a fair verdict, upholding justice and \
        maintaining order in the courtroom. The defendant showed respect for the \
        authority of the court.";

    fn run(text: &str, options: &AnalysisOptions) -> ScoreRecord {
        let lexicon = load_builtin(options.dictionary).unwrap();
        score(&tokenize(text).unwrap(), &lexicon, options).unwrap()
    }

    #[test]
    fn test_strategy_for_every_method() {
        for method in ScoringMethod::ALL {
            assert_eq!(strategy_for(method).method(), method);
        }
    }

    #[test]
    fn test_courtroom_text_favors_fairness_and_authority() {
        for method in ScoringMethod::ALL {
            let record = run(COURTROOM, &AnalysisOptions::default().with_method(method));
            let fairness = record.get("fairness_p").unwrap();
            let authority = record.get("authority_p").unwrap();
            for other in ["care_p", "loyalty_p", "sanctity_p"] {
                let value = record.get(other).unwrap();
                if method == ScoringMethod::Wordlist {
                    assert!(fairness >= value && authority >= value, "{} {}", method, other);
                } else {
                    assert!(fairness > value, "{}: fairness vs {}", method, other);
                    assert!(authority > value, "{}: authority vs {}", method, other);
                }
            }
        }
    }

    #[test]
    fn test_no_matches_gives_zero_record() {
        for kind in DictionaryKind::ALL {
            for method in ScoringMethod::ALL {
                let options = AnalysisOptions::new(kind).with_method(method);
                let record = run("blue table seventeen", &options);
                assert_eq!(record.len(), 11);
                assert!(record.iter().all(|(_, v)| v == 0.0), "{} {}", kind, method);
            }
        }
    }

    #[test]
    fn test_empty_document_gives_zero_record() {
        let lexicon = load_builtin(DictionaryKind::Mfd).unwrap();
        let options = AnalysisOptions::new(DictionaryKind::Mfd);
        let record = score(&tokenize("...").unwrap(), &lexicon, &options).unwrap();
        assert_eq!(record, ScoreRecord::zeroed(MetricLayout::ViceVirtue));
    }

    #[test]
    fn test_lexicon_kind_mismatch_is_configuration_error() {
        let lexicon = load_builtin(DictionaryKind::Mfd2).unwrap();
        let result = score(
            &tokenize("fair").unwrap(),
            &lexicon,
            &AnalysisOptions::new(DictionaryKind::Emfd),
        );
        assert!(matches!(result, Err(AnalysisError::Configuration(_))));
    }

    #[test]
    fn test_single_mapping_rejected_for_categorical() {
        let lexicon = load_builtin(DictionaryKind::Mfd).unwrap();
        let options = AnalysisOptions::new(DictionaryKind::Mfd).with_mapping(MappingMode::Single);
        let result = score(&tokenize("fair").unwrap(), &lexicon, &options);
        assert!(matches!(result, Err(AnalysisError::UnsupportedMethod(_))));
    }

    #[test]
    fn test_ratio_positive_iff_matches() {
        for kind in DictionaryKind::ALL {
            let record = run("justice", &AnalysisOptions::new(kind));
            assert!(record.get(MORAL_NONMORAL_RATIO).unwrap() > 0.0, "{}", kind);
        }
    }
}
