use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("blocked by bot detection at {url}: {reason}")]
    Blocked { url: String, reason: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not extract {field}: {reason}")]
    Extraction { field: &'static str, reason: String },
}

impl ScraperError {
    /// `true` when the marketplace served a challenge page instead of content.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, ScraperError::Blocked { .. })
    }
}
