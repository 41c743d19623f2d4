//! Weighted aggregation shared by the bow, ngram and pattern strategies.

use crate::lexicon::{CategoryTag, EmfdEntry, Entry};
use crate::types::{
    AnalysisOptions, DictionaryKind, Foundation, MappingMode, MetricLayout, Polarity, ScoreRecord,
    MORAL_NONMORAL_RATIO,
};

/// Running per-foundation sums for one document.
pub(crate) struct Accumulator {
    dictionary: DictionaryKind,
    mapping: MappingMode,
    layout: MetricLayout,
    weight_sum: f64,
    probability: [f64; 5],
    sentiment: [f64; 5],
    virtue: [f64; 5],
    vice: [f64; 5],
    matched_tokens: usize,
}

impl Accumulator {
    pub(crate) fn new(options: &AnalysisOptions) -> Self {
        Self {
            dictionary: options.dictionary,
            mapping: options.mapping,
            layout: options.layout(),
            weight_sum: 0.0,
            probability: [0.0; 5],
            sentiment: [0.0; 5],
            virtue: [0.0; 5],
            vice: [0.0; 5],
            matched_tokens: 0,
        }
    }

    /// Record one observation covering `tokens` document tokens.
    pub(crate) fn add(&mut self, entry: Entry<'_>, weight: f64, negated: bool, tokens: usize) {
        self.matched_tokens += tokens;
        match entry {
            Entry::Emfd(e) => self.add_emfd(e, weight, negated),
            Entry::Categorical(tags) => self.add_categorical(tags, weight, negated),
        }
    }

    fn add_emfd(&mut self, entry: &EmfdEntry, weight: f64, negated: bool) {
        self.weight_sum += weight;
        let sign = if negated { -1.0 } else { 1.0 };
        let only = match self.mapping {
            MappingMode::Single => Some(entry.dominant()),
            MappingMode::All => None,
        };

        for f in Foundation::ALL {
            if only.is_some_and(|d| d != f) {
                continue;
            }
            let i = f.index();
            let p = weight * entry.probability(f);
            let s = sign * entry.sentiment(f);
            self.probability[i] += p;
            self.sentiment[i] += weight * s;
            if s >= 0.0 {
                self.virtue[i] += p;
            } else {
                self.vice[i] += p;
            }
        }
    }

    fn add_categorical(&mut self, tags: &[CategoryTag], weight: f64, negated: bool) {
        for tag in tags {
            let polarity = if negated { tag.polarity.flipped() } else { tag.polarity };
            let i = tag.foundation.index();
            match polarity {
                Polarity::Virtue => self.virtue[i] += weight,
                Polarity::Vice => self.vice[i] += weight,
            }
        }
    }

    /// Normalize into a record for a document of `total_tokens` tokens.
    pub(crate) fn finish(self, total_tokens: usize) -> ScoreRecord {
        let mut record = ScoreRecord::zeroed(self.layout);

        let denominator = if self.dictionary.is_categorical() {
            total_tokens as f64
        } else {
            self.weight_sum
        };

        if denominator > 0.0 {
            for f in Foundation::ALL {
                let i = f.index();
                match self.layout {
                    MetricLayout::Sentiment => {
                        record.set(f.probability_key(), self.probability[i] / denominator);
                        record.set(f.sentiment_key(), self.sentiment[i] / denominator);
                    }
                    MetricLayout::ViceVirtue => {
                        record.set(f.polarity_key(Polarity::Virtue), self.virtue[i] / denominator);
                        record.set(f.polarity_key(Polarity::Vice), self.vice[i] / denominator);
                    }
                }
            }
        }

        record.set(
            MORAL_NONMORAL_RATIO,
            moral_nonmoral_ratio(self.matched_tokens, total_tokens),
        );
        record
    }
}

/// `matched / max(unmatched, 1)`; zero exactly when nothing matched.
pub(crate) fn moral_nonmoral_ratio(matched: usize, total: usize) -> f64 {
    if matched == 0 {
        return 0.0;
    }
    let unmatched = total.saturating_sub(matched).max(1);
    matched as f64 / unmatched as f64
}
