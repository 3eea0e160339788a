//! Read and maintenance handlers for stored reviews.

use sqlx::SqlitePool;

/// Longest title shown in the `reviews` listing before truncation.
const TITLE_WIDTH: usize = 60;

/// List stored reviews newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_list_reviews(pool: &SqlitePool, limit: Option<i64>) -> anyhow::Result<()> {
    let rows = revlens_db::list_reviews(pool, limit).await?;

    if rows.is_empty() {
        println!("no reviews stored; run `revlens scrape <URL>` first");
        return Ok(());
    }

    println!(
        "{:<6}{:<18}{:<11}{:<8}{:<10}{:<25}TITLE",
        "ID", "CREATED", "SENTIMENT", "RATING", "POLARITY", "PRODUCT"
    );
    for row in &rows {
        let created = row.created_at.format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<6}{:<18}{:<11}{:<8.1}{:<10.3}{:<25}{}",
            row.id,
            created,
            row.sentiment,
            row.rating,
            row.polarity,
            truncate(&row.product_name, 24),
            truncate(&row.review_title, TITLE_WIDTH)
        );
    }

    Ok(())
}

/// Print the summary statistics of every stored review.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_stats(pool: &SqlitePool) -> anyhow::Result<()> {
    let ratings = revlens_db::list_review_ratings(pool).await?;
    let summary = revlens_sentiment::aggregate(
        ratings.iter().map(|row| (row.sentiment.as_str(), row.rating)),
    );

    println!("total:      {}", summary.total);
    println!("positive:   {}", summary.positive);
    println!("negative:   {}", summary.negative);
    println!("neutral:    {}", summary.neutral);
    if summary.unrecognized > 0 {
        println!("unlabeled:  {}", summary.unrecognized);
    }
    println!("avg rating: {:.2}", summary.avg_rating);
    Ok(())
}

/// Delete every stored review.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub(crate) async fn run_clear(pool: &SqlitePool) -> anyhow::Result<()> {
    let removed = revlens_db::delete_all_reviews(pool).await?;
    println!("deleted {removed} review(s)");
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}
