//! Ordered extraction-rule chains.
//!
//! Marketplace markup differs by region, page version and experiment cohort,
//! so every field is located by trying several rules in order and keeping the
//! first one that yields a value. Keeping the candidates here, as data, means
//! markup churn only touches [`crate::profile`].

use scraper::{ElementRef, Html, Selector};

/// One way of pulling a value out of a document or element subtree.
pub trait ExtractRule: Send + Sync {
    type Output;

    /// Returns `None` when the rule does not apply to `scope`.
    fn try_extract(&self, scope: ElementRef<'_>) -> Option<Self::Output>;

    /// Short human-readable description, used in debug logs.
    fn describe(&self) -> &str;
}

/// Collapses every whitespace run to a single space and trims the ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Parses a CSS selector that is a compile-time constant of this crate.
///
/// # Panics
///
/// Panics if `css` is not a valid selector. Only call with literals that are
/// covered by the profile tests.
#[must_use]
pub(crate) fn css(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Whitespace-normalized text of the first element matching a selector.
pub struct TextRule {
    css: String,
    selector: Selector,
    /// Minimum number of characters (after normalization and cleanup) for
    /// the match to count.
    min_chars: usize,
    cleanup: Option<fn(&str) -> String>,
}

impl TextRule {
    #[must_use]
    pub fn new(selector: &str, min_chars: usize) -> Self {
        Self {
            css: selector.to_string(),
            selector: css(selector),
            min_chars,
            cleanup: None,
        }
    }

    /// Rewrites the matched text before the `min_chars` check, so a match
    /// that cleans down to nothing lets the chain move on to the next rule.
    #[must_use]
    pub fn cleaned(mut self, cleanup: fn(&str) -> String) -> Self {
        self.cleanup = Some(cleanup);
        self
    }
}

impl ExtractRule for TextRule {
    type Output = String;

    fn try_extract(&self, scope: ElementRef<'_>) -> Option<String> {
        let element = scope.select(&self.selector).next()?;
        let mut text = element_text(element);
        if let Some(cleanup) = self.cleanup {
            text = cleanup(&text);
        }
        (text.chars().count() >= self.min_chars).then_some(text)
    }

    fn describe(&self) -> &str {
        &self.css
    }
}

/// First non-empty attribute, from an ordered list of names, on the first
/// element matching a selector.
pub struct AttrRule {
    css: String,
    selector: Selector,
    attrs: Vec<&'static str>,
}

impl AttrRule {
    #[must_use]
    pub fn new(selector: &str, attrs: &[&'static str]) -> Self {
        Self {
            css: selector.to_string(),
            selector: css(selector),
            attrs: attrs.to_vec(),
        }
    }
}

impl ExtractRule for AttrRule {
    type Output = String;

    fn try_extract(&self, scope: ElementRef<'_>) -> Option<String> {
        let element = scope.select(&self.selector).next()?;
        self.attrs
            .iter()
            .filter_map(|name| element.value().attr(name))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn describe(&self) -> &str {
        &self.css
    }
}

/// An ordered list of rules producing the same kind of value.
pub struct RuleChain<T> {
    rules: Vec<Box<dyn ExtractRule<Output = T>>>,
}

impl<T> Default for RuleChain<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> RuleChain<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule; earlier rules win.
    #[must_use]
    pub fn then(mut self, rule: impl ExtractRule<Output = T> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Value from the first rule that applies to `scope`.
    #[must_use]
    pub fn first_match(&self, scope: ElementRef<'_>) -> Option<T> {
        self.rules.iter().find_map(|rule| {
            let value = rule.try_extract(scope);
            if value.is_some() {
                tracing::trace!(rule = rule.describe(), "extraction rule matched");
            }
            value
        })
    }
}

/// Ordered selector candidates for repeated containers such as review blocks.
///
/// The first candidate that matches at least one element wins; later
/// candidates are not consulted even if they would match more.
pub struct BlockCandidates {
    candidates: Vec<(String, Selector)>,
}

impl BlockCandidates {
    #[must_use]
    pub fn new(selectors: &[&str]) -> Self {
        Self {
            candidates: selectors.iter().map(|s| ((*s).to_string(), css(s))).collect(),
        }
    }

    /// All elements matched by the first productive candidate, with that
    /// candidate's selector text. Empty when nothing matches.
    #[must_use]
    pub fn select<'a>(&self, document: &'a Html) -> (Option<&str>, Vec<ElementRef<'a>>) {
        for (text, selector) in &self.candidates {
            let blocks: Vec<ElementRef<'a>> = document.select(selector).collect();
            if !blocks.is_empty() {
                return (Some(text.as_str()), blocks);
            }
        }
        (None, Vec::new())
    }
}
