//! Review sentiment for revlens.
//!
//! Scores review text with a general-purpose opinion lexicon, maps the
//! polarity onto three fixed buckets, and reduces stored reviews into the
//! summary shown by the `stats` command.

pub mod classify;
pub mod scorer;
pub mod stats;

pub use classify::{classify, classify_review, label_for_polarity};
pub use scorer::polarity_score;
pub use stats::aggregate;
