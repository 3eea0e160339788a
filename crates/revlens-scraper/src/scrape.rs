//! Paginating review scraper that reports through an event channel.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use revlens_core::RawReview;

use crate::client::PageClient;
use crate::error::ScraperError;
use crate::events::{FailureKind, ScrapeEvent, ScrapeOptions, ScrapeRequest, StopReason};
use crate::parse::{parse_review_page, PageContext};
use crate::profile::SiteProfile;
use crate::urls::MarketplaceUrls;

/// Why [`ReviewScraper::drive`] returned without a collected batch.
enum Halt {
    /// A terminal error event should be sent.
    Failed(ScrapeEvent),
    /// The receiver is gone; nothing more can be delivered.
    Abandoned,
}

impl From<ScraperError> for Halt {
    fn from(err: ScraperError) -> Self {
        Halt::Failed(ScrapeEvent::failed(&err))
    }
}

struct Collected {
    reviews: Vec<RawReview>,
    stop_reason: StopReason,
}

impl Collected {
    fn new(reviews: Vec<RawReview>, stop_reason: StopReason) -> Self {
        Self {
            reviews,
            stop_reason,
        }
    }
}

/// Scrapes review-listing pages, one page at a time, until the requested
/// number of reviews is collected or pagination ends.
#[derive(Debug, Clone)]
pub struct ReviewScraper {
    client: PageClient,
    urls: MarketplaceUrls,
    profile: Arc<SiteProfile>,
    options: ScrapeOptions,
}

impl ReviewScraper {
    #[must_use]
    pub fn new(client: PageClient, urls: MarketplaceUrls, options: ScrapeOptions) -> Self {
        Self {
            client,
            urls,
            profile: SiteProfile::amazon(),
            options,
        }
    }

    /// Starts the scrape on a tokio task and returns its event stream.
    ///
    /// The stream ends with exactly one terminal event unless the receiver is
    /// dropped first, which stops the task at its next send.
    #[must_use]
    pub fn spawn(
        &self,
        request: ScrapeRequest,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<ScrapeEvent> {
        let (tx, rx) = mpsc::channel(self.options.channel_capacity.max(1));
        let scraper = self.clone();
        tokio::spawn(async move {
            let task_tx = tx.clone();
            let task = tokio::spawn(async move { scraper.run(request, cancel, task_tx).await });
            // `run` sends its terminal event last, so a panic means none was sent.
            if let Err(e) = task.await {
                tracing::error!(error = %e, "scrape task failed");
                let event = ScrapeEvent::Error {
                    kind: FailureKind::Internal,
                    message: format!("scrape task failed: {e}"),
                };
                let _ = tx.send(event).await;
            }
        });
        rx
    }

    /// Runs a scrape to completion on the current task, sending events to `tx`.
    pub async fn run(
        &self,
        request: ScrapeRequest,
        cancel: CancellationToken,
        tx: mpsc::Sender<ScrapeEvent>,
    ) {
        let terminal = match self.drive(&request, &cancel, &tx).await {
            Ok(collected) => {
                tracing::info!(
                    url = %request.url,
                    count = collected.reviews.len(),
                    stop_reason = %collected.stop_reason,
                    "scrape finished"
                );
                ScrapeEvent::Result {
                    reviews: collected.reviews,
                    stop_reason: collected.stop_reason,
                }
            }
            Err(Halt::Failed(event)) => {
                tracing::warn!(url = %request.url, event = ?event, "scrape failed");
                event
            }
            Err(Halt::Abandoned) => {
                tracing::debug!(url = %request.url, "event receiver dropped, scrape abandoned");
                return;
            }
        };
        if tx.send(terminal).await.is_err() {
            tracing::debug!(url = %request.url, "event receiver dropped before terminal event");
        }
    }

    async fn drive(
        &self,
        request: &ScrapeRequest,
        cancel: &CancellationToken,
        tx: &mpsc::Sender<ScrapeEvent>,
    ) -> Result<Collected, Halt> {
        let limit = request.limit;
        emit(tx, 0, limit, "processing url".to_string()).await?;

        if !pause(cancel, Duration::from_millis(self.options.initial_delay_ms)).await {
            return Ok(Collected::new(Vec::new(), StopReason::Cancelled));
        }

        let (mut page_url, derived_id) = self.urls.review_listing_for(&request.url)?;
        let product_id = request.product_id.clone().or(derived_id);
        tracing::info!(url = %page_url, product_id = ?product_id, limit, "starting review scrape");

        if limit == 0 {
            return Ok(Collected::new(Vec::new(), StopReason::LimitReached));
        }

        let Some(fetched) = self.fetch(cancel, &page_url).await else {
            return Ok(Collected::new(Vec::new(), StopReason::Cancelled));
        };
        let mut body = fetched?;

        let mut reviews: Vec<RawReview> = Vec::new();
        let mut page = 1usize;

        loop {
            let ctx = PageContext {
                product_id: product_id.as_deref(),
                mode: self.options.mode,
                remaining: limit - reviews.len(),
                first_ordinal: reviews.len() + 1,
            };
            let parsed = parse_review_page(&body, &self.profile, &ctx);
            tracing::info!(
                url = %page_url,
                page,
                blocks = parsed.blocks_found,
                extracted = parsed.reviews.len(),
                skipped = parsed.skipped,
                "parsed review page"
            );

            if parsed.blocks_found == 0 {
                if page == 1 {
                    return Ok(Collected::new(reviews, StopReason::NoReviewBlocks));
                }
                return Ok(Collected::new(reviews, StopReason::NoMorePages));
            }

            reviews.extend(parsed.reviews);
            emit(
                tx,
                reviews.len(),
                limit,
                format!("page {page}: collected {} of {limit} reviews", reviews.len()),
            )
            .await?;

            if reviews.len() >= limit {
                return Ok(Collected::new(reviews, StopReason::LimitReached));
            }
            let Some(href) = parsed.next_href else {
                return Ok(Collected::new(reviews, StopReason::NoMorePages));
            };
            if page >= self.options.max_pages {
                tracing::warn!(page, max_pages = self.options.max_pages, "page cap reached");
                return Ok(Collected::new(reviews, StopReason::PageCap));
            }
            let next_url = match self.urls.resolve(&href) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(href, error = %e, "unusable next-page link");
                    return Ok(Collected::new(reviews, StopReason::NextPageFailed));
                }
            };
            if next_url == page_url {
                tracing::debug!(url = %next_url, "next-page link points at the current page");
                return Ok(Collected::new(reviews, StopReason::NoMorePages));
            }

            if !pause(cancel, self.page_delay()).await {
                return Ok(Collected::new(reviews, StopReason::Cancelled));
            }
            body = match self.fetch(cancel, &next_url).await {
                None => return Ok(Collected::new(reviews, StopReason::Cancelled)),
                Some(Ok(body)) => body,
                Some(Err(e)) if e.is_blocked() => {
                    tracing::warn!(
                        url = %next_url,
                        error = %e,
                        "next page blocked, keeping partial results"
                    );
                    return Ok(Collected::new(reviews, StopReason::NextPageBlocked));
                }
                Some(Err(e)) => {
                    tracing::warn!(
                        url = %next_url,
                        error = %e,
                        "next page fetch failed, keeping partial results"
                    );
                    return Ok(Collected::new(reviews, StopReason::NextPageFailed));
                }
            };
            page_url = next_url;
            page += 1;
        }
    }

    /// Fetches `url` unless cancelled first. `None` means cancelled.
    async fn fetch(
        &self,
        cancel: &CancellationToken,
        url: &str,
    ) -> Option<Result<String, ScraperError>> {
        if cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            () = cancel.cancelled() => None,
            result = self.client.fetch_page(url) => Some(result),
        }
    }

    fn page_delay(&self) -> Duration {
        let min = self.options.page_delay_min_ms;
        let max = self.options.page_delay_max_ms.max(min);
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

async fn emit(
    tx: &mpsc::Sender<ScrapeEvent>,
    count: usize,
    total: usize,
    message: String,
) -> Result<(), Halt> {
    tx.send(ScrapeEvent::Progress {
        count,
        total,
        message,
    })
    .await
    .map_err(|_| Halt::Abandoned)
}

/// Sleeps for `delay` unless cancelled. Returns `false` when cancelled.
async fn pause(cancel: &CancellationToken, delay: Duration) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        return true;
    }
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}
