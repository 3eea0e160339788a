//! Product detail extraction.

use std::sync::Arc;

use revlens_core::ProductDetails;

use crate::client::PageClient;
use crate::error::ScraperError;
use crate::parse::{parse_product_page, parse_product_page_lenient};
use crate::profile::SiteProfile;
use crate::urls::MarketplaceUrls;

/// Fetches a product-detail page and pulls name, image and price from it.
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    client: PageClient,
    urls: MarketplaceUrls,
    profile: Arc<SiteProfile>,
}

impl ProductExtractor {
    #[must_use]
    pub fn new(client: PageClient, urls: MarketplaceUrls) -> Self {
        Self {
            client,
            urls,
            profile: SiteProfile::amazon(),
        }
    }

    /// Fetches the detail page for `url` (review-listing URLs are mapped back
    /// to their product page) and extracts its fields.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `url` is not an http(s) URL.
    /// - [`ScraperError::Blocked`], [`ScraperError::UnexpectedStatus`] or
    ///   [`ScraperError::Http`] if the page cannot be fetched.
    /// - [`ScraperError::Extraction`] if the page carries no product name.
    pub async fn fetch_product_details(&self, url: &str) -> Result<ProductDetails, ScraperError> {
        let product_url = self.urls.product_page_for(url)?;
        let body = self.client.fetch_page(&product_url).await?;
        let details = parse_product_page(&body, &self.profile, &product_url)?;
        tracing::info!(
            url = %product_url,
            name = %details.product_name,
            "extracted product details"
        );
        Ok(details)
    }

    /// Lenient counterpart of [`Self::fetch_product_details`]: never fails.
    ///
    /// Each field falls back independently when its selectors miss, and any
    /// URL or fetch error yields [`ProductDetails::unavailable`].
    pub async fn extract_product_details(&self, url: &str) -> ProductDetails {
        let product_url = match self.urls.product_page_for(url) {
            Ok(product_url) => product_url,
            Err(e) => {
                tracing::warn!(url, error = %e, "product details unavailable, using defaults");
                return ProductDetails::unavailable(url);
            }
        };
        match self.client.fetch_page(&product_url).await {
            Ok(body) => parse_product_page_lenient(&body, &self.profile, &product_url),
            Err(e) => {
                tracing::warn!(
                    url = %product_url,
                    error = %e,
                    "product details unavailable, using defaults"
                );
                ProductDetails::unavailable(product_url)
            }
        }
    }
}
