use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One review as pulled off a marketplace reviews page, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    /// Marketplace product identifier (ASIN), when one could be derived.
    pub product_id: Option<String>,
    pub review_title: String,
    pub review_text: String,
    /// Star rating in `[0.0, 5.0]`.
    pub rating: f64,
}

/// Coarse three-bucket sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// The exact label persisted in the `sentiment` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sentiment label \"{0}\"")]
pub struct UnknownSentiment(pub String);

impl FromStr for Sentiment {
    type Err = UnknownSentiment;

    /// Exact, case-sensitive match against the stored labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Positive" => Ok(Sentiment::Positive),
            "Negative" => Ok(Sentiment::Negative),
            "Neutral" => Ok(Sentiment::Neutral),
            other => Err(UnknownSentiment(other.to_string())),
        }
    }
}

/// A [`RawReview`] with its sentiment label and polarity attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReview {
    #[serde(flatten)]
    pub review: RawReview,
    pub sentiment: Sentiment,
    /// Lexicon polarity in `[-1.0, 1.0]`.
    pub polarity: f64,
}

/// Summary counts over a set of stored reviews. Recomputed on every read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    /// Rows whose label matched none of the three buckets. They still count
    /// towards `total` and `avg_rating`.
    pub unrecognized: usize,
    /// Mean rating rounded to two decimals; `0.0` when `total == 0`.
    pub avg_rating: f64,
}
