//! Database operations for the `reviews` table.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use revlens_core::{ClassifiedReview, Sentiment};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `reviews` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub product_name: String,
    pub review_title: String,
    pub review_text: String,
    pub rating: f64,
    pub sentiment: String,
    pub polarity: f64,
    pub created_at: NaiveDateTime,
}

impl ReviewRow {
    /// The stored label, if it is one of the three known buckets.
    #[must_use]
    pub fn sentiment_label(&self) -> Option<Sentiment> {
        self.sentiment.parse().ok()
    }
}

/// The `(sentiment, rating)` projection used for summary statistics.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ReviewRatingRow {
    pub sentiment: String,
    pub rating: f64,
}

/// Result of a batch save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    pub saved: usize,
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Insert one classified review and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_review(
    pool: &SqlitePool,
    product_name: &str,
    review: &ClassifiedReview,
) -> Result<i64, DbError> {
    let result = sqlx::query(
        "INSERT INTO reviews \
             (product_name, review_title, review_text, rating, sentiment, polarity) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(product_name)
    .bind(&review.review.review_title)
    .bind(&review.review.review_text)
    .bind(review.review.rating)
    .bind(review.sentiment.as_str())
    .bind(review.polarity)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Insert every review in order. A failed insert is logged and skipped; the
/// rest of the batch continues.
pub async fn save_reviews(
    pool: &SqlitePool,
    product_name: &str,
    reviews: &[ClassifiedReview],
) -> SaveOutcome {
    let mut outcome = SaveOutcome::default();
    for (index, review) in reviews.iter().enumerate() {
        match insert_review(pool, product_name, review).await {
            Ok(_) => outcome.saved += 1,
            Err(e) => {
                tracing::warn!(index, product_name, error = %e, "failed to save review");
                outcome.failed += 1;
            }
        }
    }
    tracing::info!(
        product_name,
        saved = outcome.saved,
        failed = outcome.failed,
        "saved reviews"
    );
    outcome
}

/// Delete every stored review and return the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_all_reviews(pool: &SqlitePool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM reviews").execute(pool).await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// List stored reviews newest first (`id DESC`), optionally capped at `limit`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reviews(
    pool: &SqlitePool,
    limit: Option<i64>,
) -> Result<Vec<ReviewRow>, DbError> {
    let rows = match limit {
        Some(limit) => {
            sqlx::query_as::<_, ReviewRow>(
                "SELECT id, product_name, review_title, review_text, rating, sentiment, \
                        polarity, created_at \
                 FROM reviews \
                 ORDER BY id DESC \
                 LIMIT ?",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ReviewRow>(
                "SELECT id, product_name, review_title, review_text, rating, sentiment, \
                        polarity, created_at \
                 FROM reviews \
                 ORDER BY id DESC",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

/// `(sentiment, rating)` for every stored review.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_review_ratings(pool: &SqlitePool) -> Result<Vec<ReviewRatingRow>, DbError> {
    let rows =
        sqlx::query_as::<_, ReviewRatingRow>("SELECT sentiment, rating FROM reviews ORDER BY id")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

/// Number of stored reviews.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_reviews(pool: &SqlitePool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
