//! HTML parsing for review listings and product-detail pages.
//!
//! Everything here is synchronous: `scraper::Html` is not `Send`, so the
//! async scraper hands a page body in and gets owned data back without ever
//! holding a parsed document across an `.await`.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use revlens_core::{ExtractionMode, ProductDetails, RawReview};

use crate::error::ScraperError;
use crate::profile::SiteProfile;

/// Body placeholder used by lenient extraction.
pub const NO_REVIEW_TEXT: &str = "No review text found";

/// Rating used by lenient extraction when no numeral can be found.
pub const DEFAULT_RATING: f64 = 3.0;

const MAX_RATING: f64 = 5.0;

/// The site sometimes concatenates the star rating into the title text.
static STAR_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\d+(?:\.\d+)?\s+out\s+of\s+5\s+stars\s*")
        .expect("valid star prefix regex")
});
static NUMERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+|\d+").expect("valid numeral regex"));

/// Per-page extraction inputs.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub product_id: Option<&'a str>,
    pub mode: ExtractionMode,
    /// Reviews still wanted; extraction stops once this many are collected.
    pub remaining: usize,
    /// 1-based ordinal of the first review on this page, for placeholder titles.
    pub first_ordinal: usize,
}

/// Owned result of parsing one review-listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub reviews: Vec<RawReview>,
    /// Review blocks located on the page, before the `remaining` cut-off.
    pub blocks_found: usize,
    /// Blocks dropped because extraction failed.
    pub skipped: usize,
    /// Raw `href` of the "next page" link, if any.
    pub next_href: Option<String>,
}

/// Extracts reviews and the next-page link from a review-listing page.
#[must_use]
pub fn parse_review_page(html: &str, profile: &SiteProfile, ctx: &PageContext<'_>) -> ParsedPage {
    let document = Html::parse_document(html);
    let (selector, blocks) = profile.review_blocks.select(&document);
    if let Some(selector) = selector {
        tracing::debug!(selector, blocks = blocks.len(), "review block selector matched");
    }

    let mut page = ParsedPage {
        blocks_found: blocks.len(),
        next_href: profile.next_page.first_match(document.root_element()),
        ..ParsedPage::default()
    };

    for block in blocks {
        if page.reviews.len() >= ctx.remaining {
            break;
        }
        let ordinal = ctx.first_ordinal + page.reviews.len();
        match extract_review(block, profile, ctx, ordinal) {
            Ok(review) => page.reviews.push(review),
            Err(e) => {
                tracing::warn!(error = %e, ordinal, "skipping malformed review block");
                page.skipped += 1;
            }
        }
    }

    page
}

fn extract_review(
    block: ElementRef<'_>,
    profile: &SiteProfile,
    ctx: &PageContext<'_>,
    ordinal: usize,
) -> Result<RawReview, ScraperError> {
    let strict = ctx.mode == ExtractionMode::Strict;

    let review_title = match profile.review_title.first_match(block) {
        Some(title) => title,
        None if strict => return Err(missing("title", "no title selector matched")),
        None => format!("Review {ordinal}"),
    };

    let review_text = match profile.review_body.first_match(block) {
        Some(text) => text,
        None if strict => return Err(missing("body", "no body selector matched")),
        None => NO_REVIEW_TEXT.to_string(),
    };

    let rating_text = profile.review_rating.first_match(block);
    let rating = match rating_text.as_deref().and_then(parse_rating) {
        Some(rating) => rating,
        None if strict => return Err(missing("rating", "no rating numeral found")),
        None => DEFAULT_RATING,
    };

    Ok(RawReview {
        product_id: ctx.product_id.map(str::to_string),
        review_title,
        review_text,
        rating,
    })
}

fn missing(field: &'static str, reason: &str) -> ScraperError {
    ScraperError::Extraction {
        field,
        reason: reason.to_string(),
    }
}

/// Removes a leading `"4.0 out of 5 stars"` from a review title.
///
/// Title rules apply this before their emptiness check, so a match holding
/// only the star text does not count as a title.
#[must_use]
pub fn strip_star_prefix(title: &str) -> String {
    STAR_PREFIX_RE.replace(title, "").trim().to_string()
}

/// First decimal-or-integer numeral in `text`, clamped to the 0 to 5 scale.
#[must_use]
pub fn parse_rating(text: &str) -> Option<f64> {
    let numeral = NUMERAL_RE.find(text)?;
    numeral
        .as_str()
        .parse::<f64>()
        .ok()
        .map(|r| r.clamp(0.0, MAX_RATING))
}

/// Extracts product details from a product-detail page.
///
/// Missing image and price fall back to `""` and `"Price not available"`.
///
/// # Errors
///
/// Returns [`ScraperError::Extraction`] if no product name can be found,
/// which means the page is not a product page.
pub fn parse_product_page(
    html: &str,
    profile: &SiteProfile,
    product_url: &str,
) -> Result<ProductDetails, ScraperError> {
    let (name, details) = read_product(html, profile, product_url);
    match name {
        Some(product_name) => Ok(ProductDetails {
            product_name,
            ..details
        }),
        None => Err(missing("product name", "no product name selector matched")),
    }
}

/// Lenient variant of [`parse_product_page`]: a page without a recognizable
/// name yields `"Unknown Product"` and keeps whatever else was found.
#[must_use]
pub fn parse_product_page_lenient(
    html: &str,
    profile: &SiteProfile,
    product_url: &str,
) -> ProductDetails {
    let (name, details) = read_product(html, profile, product_url);
    match name {
        Some(product_name) => ProductDetails {
            product_name,
            ..details
        },
        None => details,
    }
}

fn read_product(
    html: &str,
    profile: &SiteProfile,
    product_url: &str,
) -> (Option<String>, ProductDetails) {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let mut details = ProductDetails::unavailable(product_url);
    if let Some(image) = profile.product_image.first_match(root) {
        details.product_image = image;
    }
    if let Some(price) = profile.product_price.first_match(root) {
        details.product_price = price;
    }
    (profile.product_name.first_match(root), details)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
