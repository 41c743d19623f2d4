//! Tokenization for lexicon lookup.
//!
//! Turns raw text into a [`Document`]: lowercased word tokens with
//! punctuation stripped and sentence boundaries recorded, so that the
//! positional scorer can keep negation scope inside a sentence.
//!
//! Lemmatization is an extension point: a [`Lemmatizer`] proposes candidate
//! base forms for each token, and the scorers consult them only when the
//! surface form is missing from the lexicon.

use lazy_static::lazy_static;
use regex::Regex;

use crate::AnalysisError;

lazy_static! {
    /// A word (letters/digits with internal apostrophes) or a sentence break.
    static ref TOKEN_PATTERN: Regex = Regex::new(
        r"(?P<word>[\p{L}\p{N}]+(?:['\x{2019}][\p{L}]+)*)|(?P<brk>[.!?;]|\n[ \t]*\n)"
    ).unwrap();
}

/// A single normalized token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Lowercased surface form.
    pub text: String,

    /// Candidate lemmas, most likely first. Empty unless lemmatization is on.
    pub lemmas: Vec<String>,

    /// Zero-based sentence index.
    pub sentence: usize,
}

impl Token {
    /// Surface form followed by lemma candidates.
    pub fn lookup_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.text.as_str()).chain(self.lemmas.iter().map(String::as_str))
    }
}

/// Ordered token sequence for one piece of text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    tokens: Vec<Token>,
}

impl Document {
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn sentence_count(&self) -> usize {
        self.tokens.last().map(|t| t.sentence + 1).unwrap_or(0)
    }
}

/// Proposes base forms for an inflected word.
pub trait Lemmatizer: Send + Sync {
    /// Candidate lemmas for `word` (already lowercased), most likely first.
    /// Must not include `word` itself.
    fn lemmas(&self, word: &str) -> Vec<String>;
}

/// Rule-based English suffix stripper.
///
/// Produces a few candidates per word and lets the lexicon decide which one
/// exists, e.g. `upholding -> uphold`, `loved -> lov, love`,
/// `injustices -> injustice`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixLemmatizer;

impl SuffixLemmatizer {
    fn push(candidates: &mut Vec<String>, word: &str, candidate: String) {
        if candidate.len() >= 2 && candidate != word && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
}

impl Lemmatizer for SuffixLemmatizer {
    fn lemmas(&self, word: &str) -> Vec<String> {
        let mut out = Vec::new();
        if !word.is_ascii() || word.len() <= 3 {
            return out;
        }

        if let Some(stem) = word.strip_suffix("ies") {
            Self::push(&mut out, word, format!("{}y", stem));
        }
        if let Some(stem) = word.strip_suffix("ied") {
            Self::push(&mut out, word, format!("{}y", stem));
        }
        if let Some(stem) = word.strip_suffix("ing") {
            Self::push(&mut out, word, stem.to_string());
            Self::push(&mut out, word, format!("{}e", stem));
            if let Some(single) = undouble(stem) {
                Self::push(&mut out, word, single);
            }
        }
        if let Some(stem) = word.strip_suffix("ed") {
            Self::push(&mut out, word, stem.to_string());
            Self::push(&mut out, word, format!("{}e", stem));
            if let Some(single) = undouble(stem) {
                Self::push(&mut out, word, single);
            }
        }
        if let Some(stem) = word.strip_suffix("es") {
            if ["s", "x", "z", "ch", "sh"].iter().any(|s| stem.ends_with(s)) {
                Self::push(&mut out, word, stem.to_string());
            }
        }
        if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") {
            Self::push(&mut out, word, word[..word.len() - 1].to_string());
        }
        if let Some(stem) = word.strip_suffix("ly") {
            Self::push(&mut out, word, stem.to_string());
        }

        out
    }
}

/// `runn -> run`, `committ -> commit`
fn undouble(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n >= 3 && bytes[n - 1] == bytes[n - 2] && !b"aeiouls".contains(&bytes[n - 1]) {
        Some(stem[..n - 1].to_string())
    } else {
        None
    }
}

/// Splits text into a [`Document`].
#[derive(Default)]
pub struct Tokenizer {
    lemmatizer: Option<Box<dyn Lemmatizer>>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self { lemmatizer: None }
    }

    /// Attach a lemmatizer whose candidates are stored on every token.
    pub fn with_lemmatizer(mut self, lemmatizer: Box<dyn Lemmatizer>) -> Self {
        self.lemmatizer = Some(lemmatizer);
        self
    }

    /// Tokenizer with the built-in [`SuffixLemmatizer`] when `lemmatize` is set.
    pub fn for_options(lemmatize: bool) -> Self {
        if lemmatize {
            Self::new().with_lemmatizer(Box::new(SuffixLemmatizer))
        } else {
            Self::new()
        }
    }

    /// Tokenize `text`.
    ///
    /// Fails with `InvalidInput` for empty or whitespace-only text. Text with
    /// no word characters at all yields an empty document.
    pub fn tokenize(&self, text: &str) -> Result<Document, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::InvalidInput("input text is empty".to_string()));
        }

        let mut tokens = Vec::new();
        let mut sentence = 0usize;
        let mut sentence_has_tokens = false;

        for caps in TOKEN_PATTERN.captures_iter(text) {
            if let Some(word) = caps.name("word") {
                let normalized = word.as_str().to_lowercase().replace('\u{2019}', "'");
                let lemmas = match &self.lemmatizer {
                    Some(l) => l.lemmas(&normalized),
                    None => Vec::new(),
                };
                tokens.push(Token {
                    text: normalized,
                    lemmas,
                    sentence,
                });
                sentence_has_tokens = true;
            } else if sentence_has_tokens {
                sentence += 1;
                sentence_has_tokens = false;
            }
        }

        Ok(Document { tokens })
    }
}

/// Tokenize without lemmatization.
pub fn tokenize(text: &str) -> Result<Document, AnalysisError> {
    Tokenizer::new().tokenize(text)
}
