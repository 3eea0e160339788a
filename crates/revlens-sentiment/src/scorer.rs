//! General-purpose opinion-word lexicon scorer for product review text.

/// Opinion word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("brilliant", 0.9),
    ("comfortable", 0.4),
    ("convenient", 0.4),
    ("delighted", 0.7),
    ("durable", 0.4),
    ("easy", 0.43),
    ("effective", 0.6),
    ("excellent", 1.0),
    ("exceptional", 0.67),
    ("fabulous", 0.4),
    ("fantastic", 0.4),
    ("fast", 0.2),
    ("fine", 0.42),
    ("flawless", 0.8),
    ("fresh", 0.3),
    ("friendly", 0.38),
    ("genuine", 0.4),
    ("glad", 0.5),
    ("good", 0.7),
    ("gorgeous", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("helpful", 0.5),
    ("impressive", 1.0),
    ("incredible", 0.9),
    ("like", 0.2),
    ("liked", 0.6),
    ("love", 0.5),
    ("loved", 0.7),
    ("lovely", 0.5),
    ("nice", 0.6),
    ("outstanding", 0.5),
    ("perfect", 1.0),
    ("perfectly", 1.0),
    ("pleasant", 0.73),
    ("pleased", 0.5),
    ("recommend", 0.4),
    ("recommended", 0.4),
    ("reliable", 0.45),
    ("satisfied", 0.5),
    ("smooth", 0.4),
    ("solid", 0.3),
    ("sturdy", 0.4),
    ("super", 0.33),
    ("superb", 1.0),
    ("terrific", 0.7),
    ("useful", 0.3),
    ("value", 0.2),
    ("well", 0.3),
    ("wonderful", 1.0),
    ("worth", 0.3),
    // Negative signals
    ("annoying", -0.8),
    ("awful", -1.0),
    ("bad", -0.7),
    ("broke", -0.6),
    ("broken", -0.4),
    ("cheap", -0.2),
    ("cheaply", -0.3),
    ("complaint", -0.4),
    ("damaged", -0.6),
    ("defective", -0.7),
    ("difficult", -0.5),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("dislike", -0.5),
    ("faulty", -0.6),
    ("flimsy", -0.5),
    ("fake", -0.5),
    ("hate", -0.8),
    ("hated", -0.9),
    ("horrible", -1.0),
    ("junk", -0.7),
    ("mediocre", -0.3),
    ("misleading", -0.6),
    ("noisy", -0.3),
    ("overpriced", -0.5),
    ("pathetic", -1.0),
    ("poor", -0.4),
    ("poorly", -0.4),
    ("problem", -0.3),
    ("refund", -0.2),
    ("return", -0.1),
    ("returned", -0.3),
    ("sad", -0.5),
    ("slow", -0.3),
    ("stopped", -0.3),
    ("terrible", -1.0),
    ("unhappy", -0.6),
    ("useless", -0.5),
    ("waste", -0.8),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

/// Words that scale the weight of the opinion word directly after them.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 1.3),
    ("completely", 1.3),
    ("extremely", 1.5),
    ("highly", 1.4),
    ("incredibly", 1.5),
    ("quite", 1.1),
    ("really", 1.2),
    ("so", 1.2),
    ("super", 1.3),
    ("totally", 1.3),
    ("truly", 1.2),
    ("very", 1.3),
    ("slightly", 0.6),
    ("somewhat", 0.7),
];

const NEGATORS: &[&str] = &["not", "no", "never", "nothing", "hardly", "barely", "cannot"];

/// How far back (in tokens) a negator still flips an opinion word.
const NEGATION_WINDOW: usize = 3;

/// Multiplier applied to a negated opinion word: flips direction and dampens
/// it, so "not good" is mildly negative rather than strongly negative.
const NEGATION_FACTOR: f64 = -0.5;

fn lexicon_weight(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|&&(lex_word, _)| lex_word == word)
        .map(|&(_, weight)| weight)
}

fn intensifier_factor(word: &str) -> Option<f64> {
    INTENSIFIERS
        .iter()
        .find(|&&(w, _)| w == word)
        .map(|&(_, factor)| factor)
}

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't")
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .map(|w| {
            w.trim_matches(|c: char| c == '\'' || c == '’')
                .replace('’', "'")
        })
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Score a text string with the opinion lexicon.
///
/// Every lexicon hit contributes its weight, scaled by a directly preceding
/// intensifier and flipped by a negator within the previous three tokens.
/// The polarity is the mean contribution, clamped to `[-1.0, 1.0]`.
/// Returns `0.0` for empty text or text without opinion words.
#[must_use]
pub fn polarity_score(text: &str) -> f64 {
    let tokens = tokenize(text);
    let mut sum = 0.0_f64;
    let mut hits = 0_u32;

    for (i, token) in tokens.iter().enumerate() {
        // "super" is both an opinion word and an intensifier; treat it as an
        // intensifier when another opinion word follows.
        if intensifier_factor(token).is_some()
            && tokens
                .get(i + 1)
                .is_some_and(|next| lexicon_weight(next).is_some())
        {
            continue;
        }
        let Some(mut weight) = lexicon_weight(token) else {
            continue;
        };

        if let Some(factor) = i
            .checked_sub(1)
            .and_then(|prev| intensifier_factor(&tokens[prev]))
        {
            weight = (weight * factor).clamp(-1.0, 1.0);
        }

        let window_start = i.saturating_sub(NEGATION_WINDOW);
        if tokens[window_start..i].iter().any(|t| is_negator(t)) {
            weight *= NEGATION_FACTOR;
        }

        sum += weight;
        hits += 1;
    }

    if hits == 0 {
        return 0.0;
    }
    (sum / f64::from(hits)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(polarity_score(""), 0.0);
    }

    #[test]
    fn whitespace_only_returns_zero() {
        assert_eq!(polarity_score("   "), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(polarity_score("the quick brown fox"), 0.0);
    }

    #[test]
    fn positive_keyword_returns_positive() {
        let score = polarity_score("this product is great");
        assert!(score > 0.0, "expected positive score, got {score}");
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = polarity_score("the charger arrived broken and useless");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn intensifier_strengthens_weight() {
        let plain = polarity_score("good");
        let boosted = polarity_score("very good");
        assert!(boosted > plain, "expected {boosted} > {plain}");
    }

    #[test]
    fn negation_flips_direction() {
        let score = polarity_score("this is not good");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn contraction_negation_flips_direction() {
        let score = polarity_score("I don't like it");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn negation_outside_window_is_ignored() {
        let score = polarity_score("not that the box mattered, the product is great");
        assert!(score > 0.0, "expected positive score, got {score}");
    }

    #[test]
    fn mixed_text_returns_intermediate() {
        let score = polarity_score("great screen but terrible battery");
        assert!(
            score > -1.0 && score < 1.0,
            "expected intermediate score, got {score}"
        );
    }

    #[test]
    fn score_stays_within_bounds_when_stacked() {
        let score = polarity_score("absolutely excellent, extremely perfect, truly superb");
        assert!(score <= 1.0, "expected score clamped to 1.0, got {score}");
        assert!(score > 0.9);
    }

    #[test]
    fn punctuation_stripped_from_words() {
        let score = polarity_score("great!");
        assert!(
            score > 0.0,
            "expected positive score for 'great!', got {score}"
        );
    }

    #[test]
    fn uppercase_words_match_lexicon() {
        assert!(polarity_score("TERRIBLE") < 0.0);
    }
}
