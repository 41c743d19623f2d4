//! Core types for moral foundation scoring.
//!
//! These are the data structures shared by the lexicon loader, the scorers
//! and the summary layer: foundations, dictionary and method selectors,
//! analysis options, and the flat score record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::AnalysisError;

/// Name of the density metric present in every score record.
pub const MORAL_NONMORAL_RATIO: &str = "moral_nonmoral_ratio";

/// The five moral foundations.
///
/// Declaration order is the canonical order used for iteration, output
/// columns and tie-breaking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Foundation {
    Care,
    Fairness,
    Loyalty,
    Authority,
    Sanctity,
}

impl Foundation {
    /// All foundations in canonical order.
    pub const ALL: [Foundation; 5] = [
        Foundation::Care,
        Foundation::Fairness,
        Foundation::Loyalty,
        Foundation::Authority,
        Foundation::Sanctity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Foundation::Care => "care",
            Foundation::Fairness => "fairness",
            Foundation::Loyalty => "loyalty",
            Foundation::Authority => "authority",
            Foundation::Sanctity => "sanctity",
        }
    }

    /// Position in [`Foundation::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// `care_p`
    pub fn probability_key(&self) -> String {
        format!("{}_p", self.as_str())
    }

    /// `care_sent`
    pub fn sentiment_key(&self) -> String {
        format!("{}_sent", self.as_str())
    }

    /// `care.virtue` / `care.vice`
    pub fn polarity_key(&self, polarity: Polarity) -> String {
        format!("{}.{}", self.as_str(), polarity.as_str())
    }
}

impl fmt::Display for Foundation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Virtue or vice side of a foundation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Virtue,
    Vice,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Virtue => "virtue",
            Polarity::Vice => "vice",
        }
    }

    pub fn flipped(&self) -> Polarity {
        match self {
            Polarity::Virtue => Polarity::Vice,
            Polarity::Vice => Polarity::Virtue,
        }
    }
}

/// Which dictionary schema to score against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryKind {
    /// Extended Moral Foundations Dictionary (probabilities + sentiment).
    #[default]
    Emfd,
    /// Moral Foundations Dictionary 1.0 (categorical, wildcard stems).
    Mfd,
    /// Moral Foundations Dictionary 2.0 (categorical).
    Mfd2,
}

impl DictionaryKind {
    pub const ALL: [DictionaryKind; 3] = [DictionaryKind::Emfd, DictionaryKind::Mfd, DictionaryKind::Mfd2];

    pub fn as_str(&self) -> &'static str {
        match self {
            DictionaryKind::Emfd => "emfd",
            DictionaryKind::Mfd => "mfd",
            DictionaryKind::Mfd2 => "mfd2",
        }
    }

    /// Metric family produced when the caller does not ask for one.
    pub fn default_layout(&self) -> MetricLayout {
        match self {
            DictionaryKind::Emfd => MetricLayout::Sentiment,
            DictionaryKind::Mfd | DictionaryKind::Mfd2 => MetricLayout::ViceVirtue,
        }
    }

    pub fn is_categorical(&self) -> bool {
        !matches!(self, DictionaryKind::Emfd)
    }
}

impl fmt::Display for DictionaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DictionaryKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emfd" => Ok(DictionaryKind::Emfd),
            "mfd" => Ok(DictionaryKind::Mfd),
            "mfd2" => Ok(DictionaryKind::Mfd2),
            other => Err(AnalysisError::Configuration(format!(
                "unknown dictionary '{}' (expected emfd, mfd or mfd2)",
                other
            ))),
        }
    }
}

/// Aggregation algorithm.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Weighted average over every matched token.
    #[default]
    Bow,
    /// Binary presence of distinct lexicon words.
    Wordlist,
    /// Greedy longest-first phrase matching.
    Ngram,
    /// Bag-of-words with negation scope and intensifier weighting.
    Pattern,
}

impl ScoringMethod {
    pub const ALL: [ScoringMethod; 4] = [
        ScoringMethod::Bow,
        ScoringMethod::Wordlist,
        ScoringMethod::Ngram,
        ScoringMethod::Pattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMethod::Bow => "bow",
            ScoringMethod::Wordlist => "wordlist",
            ScoringMethod::Ngram => "ngram",
            ScoringMethod::Pattern => "pattern",
        }
    }
}

impl fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bow" | "bag-of-words" => Ok(ScoringMethod::Bow),
            "wordlist" => Ok(ScoringMethod::Wordlist),
            "ngram" | "ngrams" | "gdelt.ngrams" => Ok(ScoringMethod::Ngram),
            "pattern" | "pat" => Ok(ScoringMethod::Pattern),
            other => Err(AnalysisError::UnsupportedMethod(format!(
                "unknown scoring method '{}'",
                other
            ))),
        }
    }
}

/// How an eMFD entry's weight is spread over the foundations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    /// Every foundation receives its own probability.
    #[default]
    All,
    /// Only the highest-probability foundation receives weight.
    Single,
}

impl MappingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingMode::All => "all",
            MappingMode::Single => "single",
        }
    }
}

impl fmt::Display for MappingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MappingMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(MappingMode::All),
            "single" => Ok(MappingMode::Single),
            other => Err(AnalysisError::UnsupportedMethod(format!(
                "unknown probability mapping '{}'",
                other
            ))),
        }
    }
}

/// Metric family carried by a score record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetricLayout {
    /// `{f}_p` and `{f}_sent`
    Sentiment,
    /// `{f}.virtue` and `{f}.vice`
    ViceVirtue,
}

impl MetricLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricLayout::Sentiment => "sentiment",
            MetricLayout::ViceVirtue => "vice-virtue",
        }
    }

    /// Metric names in canonical output order, ratio last.
    pub fn metric_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(11);
        match self {
            MetricLayout::Sentiment => {
                names.extend(Foundation::ALL.iter().map(Foundation::probability_key));
                names.extend(Foundation::ALL.iter().map(Foundation::sentiment_key));
            }
            MetricLayout::ViceVirtue => {
                names.extend(Foundation::ALL.iter().map(|f| f.polarity_key(Polarity::Virtue)));
                names.extend(Foundation::ALL.iter().map(|f| f.polarity_key(Polarity::Vice)));
            }
        }
        names.push(MORAL_NONMORAL_RATIO.to_string());
        names
    }
}

impl fmt::Display for MetricLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricLayout {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "sentiment" => Ok(MetricLayout::Sentiment),
            "vice-virtue" | "virtue-vice" => Ok(MetricLayout::ViceVirtue),
            other => Err(AnalysisError::UnsupportedMethod(format!(
                "unknown output metrics '{}'",
                other
            ))),
        }
    }
}

/// Tuning for the position-sensitive and presence-based scorers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringParams {
    /// Tokens after a negator that fall inside its scope.
    #[serde(default = "default_negation_window")]
    pub negation_window: usize,

    /// Weight multiplier applied to the token after an intensifier.
    #[serde(default = "default_intensifier_weight")]
    pub intensifier_weight: f64,

    /// Minimum eMFD probability for wordlist presence under `all` mapping.
    #[serde(default = "default_presence_threshold")]
    pub presence_threshold: f64,
}

fn default_negation_window() -> usize {
    3
}

fn default_intensifier_weight() -> f64 {
    1.5
}

fn default_presence_threshold() -> f64 {
    0.10
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            negation_window: default_negation_window(),
            intensifier_weight: default_intensifier_weight(),
            presence_threshold: default_presence_threshold(),
        }
    }
}

/// Everything that selects how a document is scored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AnalysisOptions {
    #[serde(default)]
    pub dictionary: DictionaryKind,

    #[serde(default)]
    pub method: ScoringMethod,

    /// Only meaningful for eMFD.
    #[serde(default)]
    pub mapping: MappingMode,

    /// Requested metric family; `None` uses the dictionary's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricLayout>,

    /// Look up rule-based lemmas when the surface form is not in the lexicon.
    #[serde(default)]
    pub lemmatize: bool,

    #[serde(default)]
    pub params: ScoringParams,
}

impl AnalysisOptions {
    pub fn new(dictionary: DictionaryKind) -> Self {
        Self {
            dictionary,
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: ScoringMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_mapping(mut self, mapping: MappingMode) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricLayout) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_lemmatize(mut self, lemmatize: bool) -> Self {
        self.lemmatize = lemmatize;
        self
    }

    /// The metric family the record will carry.
    pub fn layout(&self) -> MetricLayout {
        self.metrics.unwrap_or_else(|| self.dictionary.default_layout())
    }

    /// Reject method/mapping/metric combinations the dictionary cannot honor.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.dictionary.is_categorical() {
            if self.mapping == MappingMode::Single {
                return Err(AnalysisError::UnsupportedMethod(format!(
                    "'single' probability mapping requires the emfd dictionary, not {}",
                    self.dictionary
                )));
            }
            if self.metrics == Some(MetricLayout::Sentiment) {
                return Err(AnalysisError::UnsupportedMethod(format!(
                    "sentiment metrics require the emfd dictionary, not {}",
                    self.dictionary
                )));
            }
        }

        let params = &self.params;
        if !params.intensifier_weight.is_finite() || params.intensifier_weight <= 0.0 {
            return Err(AnalysisError::Configuration(format!(
                "intensifier_weight must be a positive number, got {}",
                params.intensifier_weight
            )));
        }
        if !(0.0..=1.0).contains(&params.presence_threshold) {
            return Err(AnalysisError::Configuration(format!(
                "presence_threshold must lie in [0, 1], got {}",
                params.presence_threshold
            )));
        }

        Ok(())
    }
}

/// Flat mapping from metric name to value for one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct ScoreRecord {
    scores: BTreeMap<String, f64>,
}

impl ScoreRecord {
    /// A record with every metric of `layout` set to zero.
    pub fn zeroed(layout: MetricLayout) -> Self {
        Self {
            scores: layout.metric_names().into_iter().map(|k| (k, 0.0)).collect(),
        }
    }

    pub fn from_map(scores: BTreeMap<String, f64>) -> Self {
        Self { scores }
    }

    pub(crate) fn set(&mut self, key: impl Into<String>, value: f64) {
        self.scores.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.scores.get(key).copied()
    }

    /// Look up a metric, failing with `MissingField` when absent.
    pub fn require(&self, key: &str) -> Result<f64, AnalysisError> {
        self.get(key)
            .ok_or_else(|| AnalysisError::MissingField(key.to_string()))
    }

    pub fn moral_nonmoral_ratio(&self) -> Option<f64> {
        self.get(MORAL_NONMORAL_RATIO)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.scores.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.scores
    }
}
