use serde::{Deserialize, Serialize};

pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";
pub const PRICE_NOT_AVAILABLE: &str = "Price not available";

/// Headline fields pulled from a marketplace product-detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub product_name: String,
    /// The product-detail URL the fields were read from.
    pub product_url: String,
    /// Main image URL, or empty when no candidate carried one.
    pub product_image: String,
    /// Price text exactly as rendered, e.g. `"₹1,299"`.
    pub product_price: String,
}

impl ProductDetails {
    /// The record returned when the page cannot be fetched or parsed.
    #[must_use]
    pub fn unavailable(product_url: impl Into<String>) -> Self {
        Self {
            product_name: UNKNOWN_PRODUCT_NAME.to_string(),
            product_url: product_url.into(),
            product_image: String::new(),
            product_price: PRICE_NOT_AVAILABLE.to_string(),
        }
    }

    /// `true` when the name came from the page rather than the fallback.
    #[must_use]
    pub fn has_name(&self) -> bool {
        self.product_name != UNKNOWN_PRODUCT_NAME
    }
}
