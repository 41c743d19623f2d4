//! Summary: turns a raw score record into labelled readings.
//!
//! Every label is a pure function of one numeric field and a fixed threshold
//! table:
//!
//! | Strength | Score |
//! |----------|-------|
//! | `very_high` | ≥ 0.15 |
//! | `high` | ≥ 0.10 |
//! | `moderate` | ≥ 0.05 |
//! | `low` | ≥ 0.01 |
//! | `very_low` | otherwise |
//!
//! | Density | `moral_nonmoral_ratio` |
//! |---------|------------------------|
//! | `very_high_moral_content` | ≥ 1.0 |
//! | `high_moral_content` | ≥ 0.5 |
//! | `moderate_moral_content` | ≥ 0.2 |
//! | `low_moral_content` | ≥ 0.1 |
//! | `very_low_moral_content` | otherwise |
//!
//! A record missing any metric the layout requires is rejected with
//! `MissingField`; absent values are never read as zero.

use serde::{Deserialize, Serialize};

use crate::types::{
    DictionaryKind, Foundation, MetricLayout, Polarity, ScoreRecord, MORAL_NONMORAL_RATIO,
};
use crate::AnalysisError;

/// Lower bounds of the strength bands, strongest first.
pub const STRENGTH_THRESHOLDS: [(f64, Strength); 4] = [
    (0.15, Strength::VeryHigh),
    (0.10, Strength::High),
    (0.05, Strength::Moderate),
    (0.01, Strength::Low),
];

/// Lower bounds of the density bands, densest first.
pub const DENSITY_THRESHOLDS: [(f64, DensityLevel); 4] = [
    (1.0, DensityLevel::VeryHigh),
    (0.5, DensityLevel::High),
    (0.2, DensityLevel::Moderate),
    (0.1, DensityLevel::Low),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl Strength {
    pub fn from_score(score: f64) -> Self {
        STRENGTH_THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, s)| *s)
            .unwrap_or(Strength::VeryLow)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum DensityLevel {
    #[serde(rename = "very_low_moral_content")]
    VeryLow,
    #[serde(rename = "low_moral_content")]
    Low,
    #[serde(rename = "moderate_moral_content")]
    Moderate,
    #[serde(rename = "high_moral_content")]
    High,
    #[serde(rename = "very_high_moral_content")]
    VeryHigh,
}

impl DensityLevel {
    pub fn from_ratio(ratio: f64) -> Self {
        DENSITY_THRESHOLDS
            .iter()
            .find(|(min, _)| ratio >= *min)
            .map(|(_, d)| *d)
            .unwrap_or(DensityLevel::VeryLow)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SentimentDirection {
    Positive,
    Negative,
    Neutral,
}

impl SentimentDirection {
    pub fn from_sentiment(sentiment: f64) -> Self {
        if sentiment > 0.0 {
            SentimentDirection::Positive
        } else if sentiment < 0.0 {
            SentimentDirection::Negative
        } else {
            SentimentDirection::Neutral
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DominantFoundation {
    pub name: Foundation,
    /// `{f}_p`, or `{f}.virtue + {f}.vice` for vice/virtue records.
    pub probability: f64,
}

/// One labelled metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FoundationReading {
    /// eMFD sentiment layout: one reading per foundation.
    Probabilistic {
        name: String,
        probability: f64,
        strength: Strength,
        sentiment: f64,
        sentiment_direction: SentimentDirection,
    },
    /// Vice/virtue layout: one reading per `{f}.{polarity}` metric.
    Categorical {
        name: String,
        score: f64,
        strength: Strength,
    },
}

impl FoundationReading {
    pub fn name(&self) -> &str {
        match self {
            FoundationReading::Probabilistic { name, .. } => name,
            FoundationReading::Categorical { name, .. } => name,
        }
    }

    pub fn strength(&self) -> Strength {
        match self {
            FoundationReading::Probabilistic { strength, .. } => *strength,
            FoundationReading::Categorical { strength, .. } => *strength,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoralDensity {
    pub ratio: f64,
    pub interpretation: DensityLevel,
}

/// Human-oriented view of a score record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub dictionary_used: DictionaryKind,
    pub layout: MetricLayout,
    pub dominant_foundation: DominantFoundation,
    /// Canonical foundation order; virtues before vices.
    pub moral_foundations: Vec<FoundationReading>,
    pub moral_density: MoralDensity,
}

impl Summary {
    pub fn reading(&self, name: &str) -> Option<&FoundationReading> {
        self.moral_foundations.iter().find(|r| r.name() == name)
    }
}

/// Summarize a record in the dictionary's default layout.
pub fn summarize(scores: &ScoreRecord, dictionary: DictionaryKind) -> Result<Summary, AnalysisError> {
    summarize_layout(scores, dictionary, dictionary.default_layout())
}

/// Summarize a record carrying the `layout` metric family.
pub fn summarize_layout(
    scores: &ScoreRecord,
    dictionary: DictionaryKind,
    layout: MetricLayout,
) -> Result<Summary, AnalysisError> {
    if dictionary.is_categorical() && layout == MetricLayout::Sentiment {
        return Err(AnalysisError::UnsupportedMethod(format!(
            "{} records carry no sentiment metrics",
            dictionary
        )));
    }

    for key in layout.metric_names() {
        scores.require(&key)?;
    }

    let mut moral_foundations = Vec::with_capacity(10);
    let mut mass = [0.0; 5];

    match layout {
        MetricLayout::Sentiment => {
            for f in Foundation::ALL {
                let probability = scores.require(&f.probability_key())?;
                let sentiment = scores.require(&f.sentiment_key())?;
                mass[f.index()] = probability;
                moral_foundations.push(FoundationReading::Probabilistic {
                    name: f.to_string(),
                    probability,
                    strength: Strength::from_score(probability),
                    sentiment,
                    sentiment_direction: SentimentDirection::from_sentiment(sentiment),
                });
            }
        }
        MetricLayout::ViceVirtue => {
            for polarity in [Polarity::Virtue, Polarity::Vice] {
                for f in Foundation::ALL {
                    let key = f.polarity_key(polarity);
                    let score = scores.require(&key)?;
                    mass[f.index()] += score;
                    moral_foundations.push(FoundationReading::Categorical {
                        name: key,
                        score,
                        strength: Strength::from_score(score),
                    });
                }
            }
        }
    }

    let mut dominant = Foundation::Care;
    for f in Foundation::ALL {
        if mass[f.index()] > mass[dominant.index()] {
            dominant = f;
        }
    }

    let ratio = scores.require(MORAL_NONMORAL_RATIO)?;

    Ok(Summary {
        dictionary_used: dictionary,
        layout,
        dominant_foundation: DominantFoundation {
            name: dominant,
            probability: mass[dominant.index()],
        },
        moral_foundations,
        moral_density: MoralDensity {
            ratio,
            interpretation: DensityLevel::from_ratio(ratio),
        },
    })
}
