//! Binary presence scoring over distinct lexicon words.
//!
//! A foundation metric is `1.0` when at least one distinct lexicon word
//! assigned to it occurs in the document. For eMFD, `{f}_sent` is the mean
//! sentiment of the distinct words assigned to `f`.

use std::collections::BTreeMap;

use super::accumulator::moral_nonmoral_ratio;
use super::ScoringStrategy;
use crate::lexicon::{Entry, Lexicon};
use crate::tokenizer::Document;
use crate::types::{
    AnalysisOptions, Foundation, MappingMode, MetricLayout, Polarity, ScoreRecord, ScoringMethod,
    MORAL_NONMORAL_RATIO,
};

/// Distinct-word presence check.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordlistStrategy;

#[derive(Default, Clone, Copy)]
struct Presence {
    words: usize,
    sentiment_sum: f64,
    virtue: bool,
    vice: bool,
}

impl ScoringStrategy for WordlistStrategy {
    fn method(&self) -> ScoringMethod {
        ScoringMethod::Wordlist
    }

    fn score(&self, document: &Document, lexicon: &Lexicon, options: &AnalysisOptions) -> ScoreRecord {
        let mut distinct: BTreeMap<&str, Entry<'_>> = BTreeMap::new();
        let mut matched = 0usize;
        for token in document.tokens() {
            let hit = token
                .lookup_forms()
                .find_map(|form| lexicon.lookup(form).map(|entry| (form, entry)));
            if let Some((form, entry)) = hit {
                matched += 1;
                distinct.entry(form).or_insert(entry);
            }
        }

        let mut presence = [Presence::default(); 5];
        for entry in distinct.values() {
            match entry {
                Entry::Emfd(e) => {
                    for f in Foundation::ALL {
                        let assigned = match options.mapping {
                            MappingMode::Single => e.dominant() == f,
                            MappingMode::All => e.probability(f) >= options.params.presence_threshold,
                        };
                        if !assigned {
                            continue;
                        }
                        let slot = &mut presence[f.index()];
                        let sentiment = e.sentiment(f);
                        slot.words += 1;
                        slot.sentiment_sum += sentiment;
                        if sentiment >= 0.0 {
                            slot.virtue = true;
                        } else {
                            slot.vice = true;
                        }
                    }
                }
                Entry::Categorical(tags) => {
                    for tag in tags.iter() {
                        let slot = &mut presence[tag.foundation.index()];
                        slot.words += 1;
                        match tag.polarity {
                            Polarity::Virtue => slot.virtue = true,
                            Polarity::Vice => slot.vice = true,
                        }
                    }
                }
            }
        }

        let mut record = ScoreRecord::zeroed(options.layout());
        for f in Foundation::ALL {
            let slot = presence[f.index()];
            match options.layout() {
                MetricLayout::Sentiment => {
                    if slot.words > 0 {
                        record.set(f.probability_key(), 1.0);
                        record.set(f.sentiment_key(), slot.sentiment_sum / slot.words as f64);
                    }
                }
                MetricLayout::ViceVirtue => {
                    record.set(f.polarity_key(Polarity::Virtue), indicator(slot.virtue));
                    record.set(f.polarity_key(Polarity::Vice), indicator(slot.vice));
                }
            }
        }
        record.set(MORAL_NONMORAL_RATIO, moral_nonmoral_ratio(matched, document.len()));
        record
    }
}

fn indicator(present: bool) -> f64 {
    if present {
        1.0
    } else {
        0.0
    }
}
