//! Marketplace page fetching, review scraping and product detail extraction.

pub mod client;
pub mod error;
pub mod events;
pub mod parse;
pub mod product;
pub mod profile;
pub(crate) mod rate_limit;
pub mod rules;
pub mod scrape;
pub mod urls;

pub use client::{ClientSettings, PageClient};
pub use error::ScraperError;
pub use events::{FailureKind, ScrapeEvent, ScrapeOptions, ScrapeRequest, StopReason};
pub use product::ProductExtractor;
pub use profile::SiteProfile;
pub use rules::{AttrRule, ExtractRule, RuleChain, TextRule};
pub use scrape::ReviewScraper;
pub use urls::MarketplaceUrls;

use revlens_core::AppConfig;

impl ClientSettings {
    /// Client settings taken from the application config.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.scraper_request_timeout_secs,
            user_agent: config.scraper_user_agent.clone(),
            max_retries: config.scraper_max_retries,
            backoff_base_secs: config.scraper_retry_backoff_base_secs,
        }
    }
}

impl ScrapeOptions {
    /// Scrape pacing taken from the application config.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            initial_delay_ms: config.scraper_initial_delay_ms,
            page_delay_min_ms: config.scraper_page_delay_min_ms,
            page_delay_max_ms: config.scraper_page_delay_max_ms,
            max_pages: config.scraper_max_pages,
            mode: config.extraction_mode,
            ..Self::default()
        }
    }
}
