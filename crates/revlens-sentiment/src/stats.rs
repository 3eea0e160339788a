//! Summary statistics over stored reviews.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use revlens_core::{Sentiment, StatsSummary};

/// Reduce `(sentiment label, rating)` pairs into a [`StatsSummary`].
///
/// Labels are matched exactly against the three stored labels. Anything else
/// is counted in `total`, `unrecognized`, and the rating sum, but in none of
/// the three buckets.
///
/// Ratings are summed as [`Decimal`] so the result does not depend on input
/// order. The mean is rounded half-to-even to two decimals.
#[must_use]
pub fn aggregate<'a, I>(reviews: I) -> StatsSummary
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut summary = StatsSummary::default();
    let mut rating_sum = Decimal::ZERO;

    for (label, rating) in reviews {
        summary.total += 1;
        match label.parse::<Sentiment>() {
            Ok(Sentiment::Positive) => summary.positive += 1,
            Ok(Sentiment::Negative) => summary.negative += 1,
            Ok(Sentiment::Neutral) => summary.neutral += 1,
            Err(e) => {
                tracing::debug!(error = %e, "review label outside the known buckets");
                summary.unrecognized += 1;
            }
        }

        if let Some(r) = Decimal::from_f64(rating) {
            rating_sum += r;
        } else {
            tracing::warn!(rating, "non-finite rating excluded from average");
        }
    }

    if summary.total > 0 {
        let avg = rating_sum / Decimal::from(summary.total);
        summary.avg_rating = avg
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
            .to_f64()
            .unwrap_or(0.0);
    }

    summary
}
