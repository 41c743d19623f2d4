//! Moral foundation lexicons.
//!
//! A [`Lexicon`] maps normalized words, wildcard stems and multi-word phrases
//! to per-foundation weights. Three schemas are supported:
//!
//! | Dictionary | Format | Entry |
//! |------------|--------|-------|
//! | eMFD | CSV table | five probabilities + five sentiments |
//! | MFD | LIWC `.dic` with `*` stems | virtue/vice category tags |
//! | MFD2 | LIWC `.dic` | virtue/vice category tags |
//!
//! Lexicons are immutable once loaded. The built-in lexicons are small
//! samples in each format, not the published dictionaries; they are parsed
//! once per process and handed out as `Arc<Lexicon>`. Point
//! [`Lexicon::load`] at a published dictionary file for full coverage.

mod builtin;
mod parser;

pub use builtin::load_builtin;
pub use parser::LexiconError;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::tokenizer::Token;
use crate::types::{DictionaryKind, Foundation, Polarity};

/// One eMFD row.
#[derive(Debug, Clone, PartialEq)]
pub struct EmfdEntry {
    /// Indexed by [`Foundation::index`].
    pub probabilities: [f64; 5],
    /// Indexed by [`Foundation::index`].
    pub sentiments: [f64; 5],
}

impl EmfdEntry {
    pub fn probability(&self, foundation: Foundation) -> f64 {
        self.probabilities[foundation.index()]
    }

    pub fn sentiment(&self, foundation: Foundation) -> f64 {
        self.sentiments[foundation.index()]
    }

    /// Highest-probability foundation; ties go to the earlier foundation.
    pub fn dominant(&self) -> Foundation {
        let mut best = Foundation::Care;
        for f in Foundation::ALL {
            if self.probability(f) > self.probability(best) {
                best = f;
            }
        }
        best
    }
}

/// MFD/MFD2 category membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryTag {
    pub foundation: Foundation,
    pub polarity: Polarity,
}

/// A lexicon hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<'a> {
    Emfd(&'a EmfdEntry),
    /// Empty for general-morality words.
    Categorical(&'a [CategoryTag]),
}

#[derive(Debug)]
enum Table {
    Emfd(HashMap<String, EmfdEntry>),
    Categorical {
        exact: HashMap<String, Vec<CategoryTag>>,
        stems: Vec<(String, Vec<CategoryTag>)>,
    },
}

/// An immutable moral foundation lexicon.
#[derive(Debug)]
pub struct Lexicon {
    kind: DictionaryKind,
    table: Table,
    max_phrase_len: usize,
    source: String,
}

impl Lexicon {
    /// Parse lexicon text in the format of `kind`.
    pub fn parse(kind: DictionaryKind, text: &str, source: impl Into<String>) -> Result<Self, LexiconError> {
        let table = match kind {
            DictionaryKind::Emfd => Table::Emfd(parser::parse_emfd_csv(text.as_bytes())?),
            DictionaryKind::Mfd | DictionaryKind::Mfd2 => {
                let dic = parser::parse_dic(text)?;
                Table::Categorical {
                    exact: dic.exact,
                    stems: dic.stems,
                }
            }
        };

        let max_phrase_len = match &table {
            Table::Emfd(map) => phrase_len(map.keys()),
            Table::Categorical { exact, .. } => phrase_len(exact.keys()),
        };

        let lexicon = Self {
            kind,
            table,
            max_phrase_len,
            source: source.into(),
        };
        tracing::debug!(
            dictionary = %kind,
            entries = lexicon.len(),
            max_phrase_len,
            source = %lexicon.source,
            "Lexicon loaded"
        );
        Ok(lexicon)
    }

    /// Load a custom lexicon file.
    pub fn from_path(kind: DictionaryKind, path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        Self::parse(kind, &contents, path.display().to_string())
    }

    /// Load from `path` when given, else the shared built-in lexicon.
    pub fn load(kind: DictionaryKind, path: Option<&Path>) -> Result<Arc<Self>, LexiconError> {
        match path {
            Some(p) => Self::from_path(kind, p).map(Arc::new),
            None => load_builtin(kind),
        }
    }

    pub fn kind(&self) -> DictionaryKind {
        self.kind
    }

    /// Where the lexicon came from (`builtin:emfd-sample` or a file path).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of entries, stems included.
    pub fn len(&self) -> usize {
        match &self.table {
            Table::Emfd(map) => map.len(),
            Table::Categorical { exact, stems } => exact.len() + stems.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Token count of the longest phrase entry (1 when there are none).
    pub fn max_phrase_len(&self) -> usize {
        self.max_phrase_len
    }

    /// Look up a normalized key.
    ///
    /// Exact entries win over wildcard stems; stems only match single words.
    pub fn lookup(&self, key: &str) -> Option<Entry<'_>> {
        match &self.table {
            Table::Emfd(map) => map.get(key).map(Entry::Emfd),
            Table::Categorical { exact, stems } => {
                if let Some(tags) = exact.get(key) {
                    return Some(Entry::Categorical(tags));
                }
                if key.contains(' ') {
                    return None;
                }
                stems
                    .iter()
                    .find(|(stem, _)| key.starts_with(stem.as_str()))
                    .map(|(_, tags)| Entry::Categorical(tags))
            }
        }
    }

    /// Look up a token by surface form, then by each lemma candidate.
    pub fn lookup_token(&self, token: &Token) -> Option<Entry<'_>> {
        token.lookup_forms().find_map(|form| self.lookup(form))
    }
}

fn phrase_len<'a>(keys: impl Iterator<Item = &'a String>) -> usize {
    keys.map(|k| k.split(' ').count()).max().unwrap_or(1).max(1)
}
