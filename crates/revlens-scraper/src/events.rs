//! Events emitted by a running review scrape.

use serde::Serialize;

use revlens_core::{ExtractionMode, RawReview};

use crate::error::ScraperError;

/// What to scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    /// Product-detail or review-listing URL.
    pub url: String,
    /// Overrides the product id derived from `url`.
    pub product_id: Option<String>,
    /// Target number of reviews.
    pub limit: usize,
}

/// Pacing and extraction knobs for [`crate::ReviewScraper`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOptions {
    /// Fixed pause before the first fetch.
    pub initial_delay_ms: u64,
    /// Inclusive range of the random pause between pages.
    pub page_delay_min_ms: u64,
    pub page_delay_max_ms: u64,
    /// Hard cap on pages fetched per scrape.
    pub max_pages: usize,
    pub mode: ExtractionMode,
    /// Bound of the event channel handed back by `spawn`.
    pub channel_capacity: usize,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1_000,
            page_delay_min_ms: 2_000,
            page_delay_max_ms: 5_000,
            max_pages: 50,
            mode: ExtractionMode::Lenient,
            channel_capacity: 16,
        }
    }
}

/// Why a successful scrape stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The requested number of reviews was collected.
    LimitReached,
    /// The last page had no "next page" link, or it pointed back at itself.
    NoMorePages,
    /// The first page had no review blocks at all.
    NoReviewBlocks,
    /// `max_pages` pages were fetched.
    PageCap,
    /// A later page was a bot-detection challenge.
    NextPageBlocked,
    /// A later page could not be fetched.
    NextPageFailed,
    /// The scrape was cancelled by the caller.
    Cancelled,
}

impl StopReason {
    /// `true` when the scrape stopped early for a reason other than running
    /// out of pages or reaching the limit.
    #[must_use]
    pub fn is_degraded(self) -> bool {
        matches!(
            self,
            StopReason::NextPageBlocked | StopReason::NextPageFailed | StopReason::Cancelled
        )
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StopReason::LimitReached => "limit reached",
            StopReason::NoMorePages => "no more pages",
            StopReason::NoReviewBlocks => "no review blocks found",
            StopReason::PageCap => "page cap reached",
            StopReason::NextPageBlocked => "next page blocked",
            StopReason::NextPageFailed => "next page failed",
            StopReason::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Category of a failed scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Blocked,
    InvalidUrl,
    /// The scrape task itself failed.
    Internal,
}

impl From<&ScraperError> for FailureKind {
    fn from(err: &ScraperError) -> Self {
        match err {
            ScraperError::Http(_) | ScraperError::UnexpectedStatus { .. } => FailureKind::Network,
            ScraperError::Blocked { .. } => FailureKind::Blocked,
            ScraperError::InvalidUrl { .. } => FailureKind::InvalidUrl,
            ScraperError::Extraction { .. } => FailureKind::Internal,
        }
    }
}

/// One item of a scrape's event stream. Every stream ends with exactly one
/// `Result` or `Error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrapeEvent {
    Progress {
        count: usize,
        total: usize,
        message: String,
    },
    Result {
        reviews: Vec<RawReview>,
        stop_reason: StopReason,
    },
    Error {
        kind: FailureKind,
        message: String,
    },
}

impl ScrapeEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScrapeEvent::Progress { .. })
    }

    pub(crate) fn failed(err: &ScraperError) -> Self {
        ScrapeEvent::Error {
            kind: FailureKind::from(err),
            message: err.to_string(),
        }
    }
}
