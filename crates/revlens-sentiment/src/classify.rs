//! Three-bucket sentiment labelling on top of [`polarity_score`].

use revlens_core::{ClassifiedReview, RawReview, Sentiment};

use crate::scorer::polarity_score;

/// Polarity strictly above this is `Positive`.
pub const POSITIVE_THRESHOLD: f64 = 0.1;
/// Polarity strictly below this is `Negative`.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// Map a polarity onto a label. Both thresholds are exclusive, so `0.1` and
/// `-0.1` are `Neutral`; so is `NaN`.
#[must_use]
pub fn label_for_polarity(polarity: f64) -> Sentiment {
    if polarity > POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if polarity < NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Score `text` and label it.
#[must_use]
pub fn classify(text: &str) -> (Sentiment, f64) {
    let polarity = polarity_score(text);
    (label_for_polarity(polarity), polarity)
}

/// Label a scraped review by its body text.
#[must_use]
pub fn classify_review(review: RawReview) -> ClassifiedReview {
    let (sentiment, polarity) = classify(&review.review_text);
    tracing::debug!(
        title = %review.review_title,
        %sentiment,
        polarity,
        "classified review"
    );
    ClassifiedReview {
        review,
        sentiment,
        polarity,
    }
}
