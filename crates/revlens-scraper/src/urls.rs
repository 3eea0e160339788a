//! Marketplace URL templates and product-identifier extraction.
//!
//! Product-detail pages live at `{base}/dp/{ASIN}` (often with a slug before
//! `/dp/`), and the full review listing at `{base}/product-reviews/{ASIN}/...`.
//! Either form can be handed to the scraper; these helpers convert between
//! them.

use reqwest::Url;

use crate::error::ScraperError;

const REVIEWS_SEGMENT: &str = "/product-reviews/";
const DETAIL_SEGMENTS: &[&str] = &["/dp/", "/gp/product/"];

/// Suffix appended after the ASIN in the review-listing template.
const REVIEWS_SUFFIX: &str = "ref=cm_cr_dp_d_show_all_btm?ie=UTF8&reviewerType=all_reviews";

/// URL templates for one marketplace, rooted at `base_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceUrls {
    base_url: String,
}

impl MarketplaceUrls {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] unless `base_url` is an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ScraperError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        parse_http_url(&base_url)?;
        Ok(Self { base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn reviews_url(&self, product_id: &str) -> String {
        format!(
            "{}{REVIEWS_SEGMENT}{product_id}/{REVIEWS_SUFFIX}",
            self.base_url
        )
    }

    #[must_use]
    pub fn product_url(&self, product_id: &str) -> String {
        format!("{}/dp/{product_id}", self.base_url)
    }

    /// Where to start a review scrape for `url`, plus the product id if one
    /// is embedded in it.
    ///
    /// Detail-page URLs are rewritten to the review-listing template; review
    /// URLs and anything unrecognised are used unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `url` is not an http(s) URL.
    pub fn review_listing_for(&self, url: &str) -> Result<(String, Option<String>), ScraperError> {
        parse_http_url(url)?;
        if is_reviews_url(url) {
            return Ok((url.to_string(), product_id_from_url(url)));
        }
        match product_id_from_url(url) {
            Some(id) => Ok((self.reviews_url(&id), Some(id))),
            None => Ok((url.to_string(), None)),
        }
    }

    /// The product-detail page for `url`. Review-listing URLs are mapped back
    /// to `{base}/dp/{ASIN}`; everything else is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `url` is not an http(s) URL.
    pub fn product_page_for(&self, url: &str) -> Result<String, ScraperError> {
        parse_http_url(url)?;
        if is_reviews_url(url) {
            if let Some(id) = product_id_from_url(url) {
                return Ok(self.product_url(&id));
            }
        }
        Ok(url.to_string())
    }

    /// Resolve a (usually relative) pagination link against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if the joined URL is malformed.
    pub fn resolve(&self, href: &str) -> Result<String, ScraperError> {
        let base = parse_http_url(&self.base_url)?;
        base.join(href)
            .map(String::from)
            .map_err(|e| ScraperError::InvalidUrl {
                url: href.to_string(),
                reason: e.to_string(),
            })
    }
}

/// `true` when `url` points at a review listing rather than a detail page.
#[must_use]
pub fn is_reviews_url(url: &str) -> bool {
    url.contains(REVIEWS_SEGMENT)
}

/// Extracts the product identifier that follows `/product-reviews/`, `/dp/`
/// or `/gp/product/` in `url`.
#[must_use]
pub fn product_id_from_url(url: &str) -> Option<String> {
    std::iter::once(REVIEWS_SEGMENT)
        .chain(DETAIL_SEGMENTS.iter().copied())
        .find_map(|segment| {
            let (_, rest) = url.split_once(segment)?;
            let id = rest
                .split(['/', '?', '#'])
                .next()
                .unwrap_or_default()
                .trim();
            (!id.is_empty()).then(|| id.to_string())
        })
}

fn parse_http_url(url: &str) -> Result<Url, ScraperError> {
    let parsed = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }
    Ok(parsed)
}
