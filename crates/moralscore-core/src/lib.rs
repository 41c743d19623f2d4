//! # moralscore-core
//!
//! Lexicon-based moral foundation scoring.
//!
//! This crate scores a document along the five moral foundations (care,
//! fairness, loyalty, authority, sanctity) against one of three lexicons:
//! - **eMFD**: per-word foundation probabilities and sentiments
//! - **MFD**: virtue/vice categories with wildcard stems
//! - **MFD2**: virtue/vice categories
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same text and options always give the same record
//! 2. **Pure**: No I/O beyond reading lexicon files
//! 3. **Shared lexicons**: Built-in lexicons are parsed once and shared read-only
//! 4. **Signalled gaps**: The summary rejects incomplete records instead of defaulting
//!
//! The built-in lexicons are small samples of each format, reported as
//! `builtin:<dict>-sample`. Use [`analyze_with_lexicon`] with a lexicon loaded
//! from the published dictionary files for research-grade scores.
//!
//! ## Example
//!
//! ```rust,ignore
//! use moralscore_core::{analyze, summarize, AnalysisOptions, DictionaryKind};
//!
//! let options = AnalysisOptions::new(DictionaryKind::Emfd);
//! let scores = analyze("The judge delivered a fair verdict.", &options)?;
//! let summary = summarize(&scores, DictionaryKind::Emfd)?;
//! println!("dominant: {}", summary.dominant_foundation.name);
//! ```

pub mod lexicon;
pub mod scoring;
pub mod summary;
pub mod tokenizer;
pub mod types;

// Re-export main types at crate root
pub use lexicon::{load_builtin, CategoryTag, EmfdEntry, Entry, Lexicon, LexiconError};
pub use scoring::{score, strategy_for, ScoringStrategy};
pub use summary::{
    summarize, summarize_layout, DensityLevel, DominantFoundation, FoundationReading,
    MoralDensity, SentimentDirection, Strength, Summary,
};
pub use tokenizer::{tokenize, Document, Lemmatizer, SuffixLemmatizer, Token, Tokenizer};
pub use types::{
    AnalysisOptions, DictionaryKind, Foundation, MappingMode, MetricLayout, Polarity,
    ScoreRecord, ScoringMethod, ScoringParams, MORAL_NONMORAL_RATIO,
};

use thiserror::Error;

/// Errors that can occur during analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Missing score field: {0}")]
    MissingField(String),
}

impl From<LexiconError> for AnalysisError {
    fn from(err: LexiconError) -> Self {
        AnalysisError::Configuration(err.to_string())
    }
}

/// Score `text` against the built-in sample lexicon for `options.dictionary`.
///
/// This is the main entry point for scoring.
///
/// # Errors
///
/// - `InvalidInput` for empty or whitespace-only text
/// - `UnsupportedMethod` for option combinations the dictionary cannot honor
/// - `Configuration` if the built-in lexicon cannot be loaded
pub fn analyze(text: &str, options: &AnalysisOptions) -> Result<ScoreRecord, AnalysisError> {
    options.validate()?;
    let lexicon = load_builtin(options.dictionary)?;
    analyze_with_lexicon(text, &lexicon, options)
}

/// Score `text` against a caller-supplied lexicon.
pub fn analyze_with_lexicon(
    text: &str,
    lexicon: &Lexicon,
    options: &AnalysisOptions,
) -> Result<ScoreRecord, AnalysisError> {
    let document = Tokenizer::for_options(options.lemmatize).tokenize(text)?;
    score(&document, lexicon, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COURTROOM: &str = "The judge delivered a fair verdict, upholding justice and \
        maintaining order in the courtroom. The defendant showed respect for the \
        authority of the court.";

    #[test]
    fn test_basic_analysis() {
        let record = analyze(COURTROOM, &AnalysisOptions::default()).unwrap();
        let fairness = record.get("fairness_p").unwrap();
        let authority = record.get("authority_p").unwrap();
        for other in ["care_p", "loyalty_p", "sanctity_p"] {
            assert!(fairness > record.get(other).unwrap());
            assert!(authority > record.get(other).unwrap());
        }
    }

    #[test]
    fn test_empty_text_rejected_for_every_dictionary() {
        for kind in DictionaryKind::ALL {
            let result = analyze("", &AnalysisOptions::new(kind));
            assert!(matches!(result, Err(AnalysisError::InvalidInput(_))), "{}", kind);
        }
    }

    #[test]
    fn test_lexicon_error_maps_to_configuration() {
        let err: AnalysisError = LexiconError::Empty.into();
        assert!(matches!(err, AnalysisError::Configuration(_)));
    }

    #[test]
    fn test_custom_lexicon() {
        let lexicon = Lexicon::parse(
            DictionaryKind::Mfd2,
            "%\n1\tsanctity.virtue\n%\nshrine\t1\n",
            "inline",
        )
        .unwrap();
        let record =
            analyze_with_lexicon("the shrine", &lexicon, &AnalysisOptions::new(DictionaryKind::Mfd2))
                .unwrap();
        assert_eq!(record.get("sanctity.virtue"), Some(0.5));
    }
}

#[cfg(test)]
mod cross_method_tests {
    //! Properties that hold for every dictionary and scoring method.

    use super::*;

    const SAMPLES: [&str; 5] = [
        "The judge delivered a fair verdict.",
        "They betrayed their own family and showed no loyalty.",
        "Not a single act of kindness. Very cruel, deeply unfair!",
        "blue table seventeen",
        "?!",
    ];

    fn all_options() -> Vec<AnalysisOptions> {
        let mut out = Vec::new();
        for method in ScoringMethod::ALL {
            out.push(AnalysisOptions::new(DictionaryKind::Emfd).with_method(method));
            out.push(
                AnalysisOptions::new(DictionaryKind::Emfd)
                    .with_method(method)
                    .with_mapping(MappingMode::Single),
            );
            out.push(
                AnalysisOptions::new(DictionaryKind::Emfd)
                    .with_method(method)
                    .with_metrics(MetricLayout::ViceVirtue),
            );
            out.push(AnalysisOptions::new(DictionaryKind::Mfd).with_method(method));
            out.push(
                AnalysisOptions::new(DictionaryKind::Mfd2)
                    .with_method(method)
                    .with_lemmatize(true),
            );
        }
        out
    }

    #[test]
    fn test_records_carry_exactly_the_layout_metrics() {
        for options in all_options() {
            for text in SAMPLES {
                let record = analyze(text, &options).unwrap();
                let keys: Vec<&str> = record.keys().collect();
                let mut expected = options.layout().metric_names();
                expected.sort();
                assert_eq!(keys, expected, "{:?} {:?}", options, text);
            }
        }
    }

    #[test]
    fn test_ratio_is_zero_exactly_without_matches() {
        for options in all_options() {
            for text in SAMPLES {
                let record = analyze(text, &options).unwrap();
                let ratio = record.moral_nonmoral_ratio().unwrap();
                assert!(ratio >= 0.0 && ratio.is_finite());

                let any_metric = record
                    .iter()
                    .any(|(k, v)| k != MORAL_NONMORAL_RATIO && v != 0.0);
                if ratio == 0.0 {
                    assert!(!any_metric, "{:?} {:?}", options, text);
                }
            }
        }
    }

    #[test]
    fn test_every_record_summarizes() {
        for options in all_options() {
            for text in SAMPLES {
                let record = analyze(text, &options).unwrap();
                let summary = summarize_layout(&record, options.dictionary, options.layout()).unwrap();
                assert_eq!(summary.dictionary_used, options.dictionary);
            }
        }
    }

    #[test]
    fn test_summary_dominant_matches_highest_probability() {
        let record = analyze(SAMPLES[0], &AnalysisOptions::default()).unwrap();
        let summary = summarize(&record, DictionaryKind::Emfd).unwrap();

        let mut best = Foundation::Care;
        for f in Foundation::ALL {
            if record.get(&f.probability_key()) > record.get(&best.probability_key()) {
                best = f;
            }
        }
        assert_eq!(summary.dominant_foundation.name, best);
    }
}
