//! Sample lexicons shipped inside the binary.
//!
//! These are small hand-curated excerpts in the eMFD, MFD and MFD2 formats,
//! not the published dictionaries. They report their source as
//! `builtin:<dict>-sample`; load the published files through
//! [`Lexicon::from_path`] for research-grade scores.

use lazy_static::lazy_static;
use std::sync::Arc;

use super::{Lexicon, LexiconError};
use crate::types::DictionaryKind;

const EMFD_DATA: &str = include_str!("../../data/emfd-sample.csv");
const MFD_DATA: &str = include_str!("../../data/mfd-sample.dic");
const MFD2_DATA: &str = include_str!("../../data/mfd2-sample.dic");

lazy_static! {
    static ref EMFD: Result<Arc<Lexicon>, String> = build(DictionaryKind::Emfd, EMFD_DATA);
    static ref MFD: Result<Arc<Lexicon>, String> = build(DictionaryKind::Mfd, MFD_DATA);
    static ref MFD2: Result<Arc<Lexicon>, String> = build(DictionaryKind::Mfd2, MFD2_DATA);
}

fn build(kind: DictionaryKind, data: &str) -> Result<Arc<Lexicon>, String> {
    Lexicon::parse(kind, data, format!("builtin:{}-sample", kind))
        .map(Arc::new)
        .map_err(|e| e.to_string())
}

/// The built-in sample lexicon for `kind`, parsed on first use and shared afterwards.
pub fn load_builtin(kind: DictionaryKind) -> Result<Arc<Lexicon>, LexiconError> {
    let cached = match kind {
        DictionaryKind::Emfd => &*EMFD,
        DictionaryKind::Mfd => &*MFD,
        DictionaryKind::Mfd2 => &*MFD2,
    };
    cached
        .as_ref()
        .map(Arc::clone)
        .map_err(|reason| LexiconError::Builtin(kind.as_str(), reason.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Entry;
    use crate::types::{Foundation, Polarity};

    #[test]
    fn test_all_builtins_load() {
        for kind in DictionaryKind::ALL {
            let lexicon = load_builtin(kind).unwrap();
            assert_eq!(lexicon.kind(), kind);
            assert!(!lexicon.is_empty(), "{} is empty", kind);
            assert_eq!(lexicon.source(), format!("builtin:{}-sample", kind));
        }
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = load_builtin(DictionaryKind::Mfd2).unwrap();
        let b = load_builtin(DictionaryKind::Mfd2).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_emfd_courtroom_words_lean_fairness_and_authority() {
        let lexicon = load_builtin(DictionaryKind::Emfd).unwrap();
        for word in ["fair", "justice", "verdict"] {
            match lexicon.lookup(word) {
                Some(Entry::Emfd(e)) => assert_eq!(e.dominant(), Foundation::Fairness, "{}", word),
                other => panic!("{} -> {:?}", word, other),
            }
        }
        for word in ["authority", "order", "court"] {
            match lexicon.lookup(word) {
                Some(Entry::Emfd(e)) => assert_eq!(e.dominant(), Foundation::Authority, "{}", word),
                other => panic!("{} -> {:?}", word, other),
            }
        }
    }

    #[test]
    fn test_emfd_has_phrases() {
        let lexicon = load_builtin(DictionaryKind::Emfd).unwrap();
        assert!(lexicon.max_phrase_len() >= 3);
        assert!(lexicon.lookup("human rights").is_some());
    }

    #[test]
    fn test_mfd_stem_matches_inflection() {
        let lexicon = load_builtin(DictionaryKind::Mfd).unwrap();
        match lexicon.lookup("authorities") {
            Some(Entry::Categorical(tags)) => assert!(tags.iter().any(|t| {
                t.foundation == Foundation::Authority && t.polarity == Polarity::Virtue
            })),
            other => panic!("unexpected {:?}", other),
        }
    }
}
