//! `scrape` and `product` command handlers.
//!
//! A scrape runs on its own task and reports through an event channel; this
//! module drains the channel, classifies whatever the scrape returned, and
//! persists it. Ctrl-C cancels the scrape and keeps the reviews collected so
//! far.

use revlens_core::{AppConfig, ClassifiedReview, ExtractionMode};
use revlens_scraper::{
    ClientSettings, MarketplaceUrls, PageClient, ProductExtractor, ReviewScraper, ScrapeEvent,
    ScrapeOptions, ScrapeRequest,
};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub(crate) struct ScrapeArgs {
    pub url: String,
    pub limit: usize,
    pub product_name: Option<String>,
    pub strict: bool,
}

fn marketplace(config: &AppConfig) -> anyhow::Result<(PageClient, MarketplaceUrls)> {
    let client = PageClient::new(&ClientSettings::from_app_config(config))?;
    let urls = MarketplaceUrls::new(&config.marketplace_base_url)?;
    Ok((client, urls))
}

/// Scrape, classify and (unless `pool` is `None`) persist reviews for one product.
///
/// With no pool the classified reviews are printed as JSON instead.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, or if the scrape ends
/// with an error event (first page blocked, unreachable, or invalid URL).
/// Individual insert failures are counted, not returned.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    pool: Option<&SqlitePool>,
    args: ScrapeArgs,
) -> anyhow::Result<()> {
    let (client, urls) = marketplace(config)?;

    let product_name = if let Some(name) = args.product_name {
        name
    } else {
        ProductExtractor::new(client.clone(), urls.clone())
            .extract_product_details(&args.url)
            .await
            .product_name
    };

    let mut options = ScrapeOptions::from_app_config(config);
    if args.strict {
        options.mode = ExtractionMode::Strict;
    }
    let scraper = ReviewScraper::new(client, urls, options);

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("ctrl-c received, cancelling scrape");
                cancel.cancel();
            }
        }
    });

    let request = ScrapeRequest {
        url: args.url.clone(),
        product_id: None,
        limit: args.limit,
    };
    let mut events = scraper.spawn(request, cancel);

    let mut terminal = None;
    while let Some(event) = events.recv().await {
        match event {
            ScrapeEvent::Progress {
                count,
                total,
                message,
            } => println!("[{count}/{total}] {message}"),
            other => {
                terminal = Some(other);
                break;
            }
        }
    }
    ctrl_c.abort();

    let (reviews, stop_reason) = match terminal {
        Some(ScrapeEvent::Result {
            reviews,
            stop_reason,
        }) => (reviews, stop_reason),
        Some(ScrapeEvent::Error { kind, message }) => {
            anyhow::bail!("scrape failed ({kind:?}): {message}")
        }
        Some(ScrapeEvent::Progress { .. }) | None => {
            anyhow::bail!("scrape ended without a result")
        }
    };

    if reviews.is_empty() {
        println!("no reviews found for '{product_name}' ({stop_reason})");
        return Ok(());
    }
    if stop_reason.is_degraded() {
        println!(
            "scrape stopped early ({stop_reason}); keeping {} review(s)",
            reviews.len()
        );
    }

    let classified: Vec<ClassifiedReview> = reviews
        .into_iter()
        .map(revlens_sentiment::classify_review)
        .collect();

    if let Some(pool) = pool {
        let outcome = revlens_db::save_reviews(pool, &product_name, &classified).await;
        println!(
            "saved {} review(s) for '{product_name}' ({} failed)",
            outcome.saved, outcome.failed
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&classified)?);
        println!(
            "dry run: {} review(s) for '{product_name}' not saved",
            classified.len()
        );
    }

    Ok(())
}

/// Print product details for `url` as JSON. Never fails on fetch errors; the
/// default record is printed instead.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the configured
/// marketplace base URL is invalid.
pub(crate) async fn run_product(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let (client, urls) = marketplace(config)?;
    let details = ProductExtractor::new(client, urls)
        .extract_product_details(url)
        .await;
    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}
