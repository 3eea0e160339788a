//! Selector profiles for supported marketplaces.
//!
//! A [`SiteProfile`] bundles every ordered rule chain the parsers consult.
//! Only the Amazon layout ships today; other marketplaces get their own
//! constructor here.

use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::parse::strip_star_prefix;
use crate::rules::{AttrRule, BlockCandidates, RuleChain, TextRule};

/// Review bodies at or below this many characters are treated as missing.
const MIN_BODY_CHARS: usize = 11;

static AMAZON: LazyLock<Arc<SiteProfile>> =
    LazyLock::new(|| Arc::new(SiteProfile::build_amazon()));

/// Ordered extraction rules for one marketplace layout.
pub struct SiteProfile {
    name: &'static str,
    pub(crate) review_blocks: BlockCandidates,
    pub(crate) review_title: RuleChain<String>,
    pub(crate) review_body: RuleChain<String>,
    pub(crate) review_rating: RuleChain<String>,
    pub(crate) next_page: RuleChain<String>,
    pub(crate) product_name: RuleChain<String>,
    pub(crate) product_image: RuleChain<String>,
    pub(crate) product_price: RuleChain<String>,
}

impl fmt::Debug for SiteProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteProfile")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SiteProfile {
    /// Shared Amazon (India) profile.
    #[must_use]
    pub fn amazon() -> Arc<Self> {
        Arc::clone(&AMAZON)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn build_amazon() -> Self {
        // The star rating can sit inside the title anchor, either in its own
        // span or concatenated into the title text.
        let title = |selector: &str| TextRule::new(selector, 1).cleaned(strip_star_prefix);

        Self {
            name: "amazon",
            review_blocks: BlockCandidates::new(&[
                "div[data-hook='review']",
                "div.review",
                "div.a-section.review",
                "[data-hook='review-body'] span",
            ]),
            review_title: RuleChain::new()
                .then(title("[data-hook='review-title'] span"))
                .then(title("[data-hook='review-title']"))
                .then(title("h5 a span"))
                .then(title(".review-title")),
            review_body: RuleChain::new()
                .then(TextRule::new("[data-hook='review-body'] span", MIN_BODY_CHARS))
                .then(TextRule::new("[data-hook='review-body']", MIN_BODY_CHARS))
                .then(TextRule::new(".review-text", MIN_BODY_CHARS))
                .then(TextRule::new("span[data-hook='review-body']", MIN_BODY_CHARS)),
            review_rating: RuleChain::new()
                .then(TextRule::new("[data-hook='review-star-rating'] span", 1))
                .then(TextRule::new("[data-hook='review-star-rating']", 1))
                .then(TextRule::new("[data-hook='cmps-review-star-rating'] span", 1))
                .then(TextRule::new(".review-rating", 1))
                .then(TextRule::new("i.a-icon-star span", 1)),
            next_page: RuleChain::new()
                .then(AttrRule::new("li.a-last a", &["href"]))
                .then(AttrRule::new("a.s-pagination-next", &["href"])),
            product_name: RuleChain::new()
                .then(TextRule::new("#productTitle", 1))
                .then(TextRule::new("h1.a-size-large", 1))
                .then(TextRule::new(".product-title", 1))
                .then(TextRule::new("h1 span", 1)),
            product_image: RuleChain::new()
                .then(AttrRule::new("#landingImage", &["src", "data-src"]))
                .then(AttrRule::new(".a-dynamic-image", &["src", "data-src"]))
                .then(AttrRule::new("img.a-image-wrapper img", &["src", "data-src"]))
                .then(AttrRule::new("#imgBlkFront", &["src", "data-src"])),
            product_price: RuleChain::new()
                .then(TextRule::new(".a-price-whole", 1))
                .then(TextRule::new(".a-offscreen", 1))
                .then(TextRule::new(".a-price .a-offscreen", 1))
                .then(TextRule::new("#corePrice_feature_div .a-price .a-offscreen", 1))
                .then(TextRule::new(".a-size-medium.a-color-price", 1)),
        }
    }
}
