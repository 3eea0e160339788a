//! Shared domain types and configuration for the revlens workspace.

pub mod app_config;
pub mod config;
pub mod products;
pub mod reviews;

pub use app_config::{AppConfig, Environment, ExtractionMode};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{ProductDetails, PRICE_NOT_AVAILABLE, UNKNOWN_PRODUCT_NAME};
pub use reviews::{ClassifiedReview, RawReview, Sentiment, StatsSummary, UnknownSentiment};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
