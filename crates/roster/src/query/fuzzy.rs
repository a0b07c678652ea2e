//! Fuzzy string scoring.
//!
//! Scores are integers in `0..=100`. The weighted ratio combines a plain
//! character ratio with token-sorted, token-set and partial (substring)
//! variants, so that case, punctuation, word order and a few typos cost
//! little.

use std::collections::BTreeSet;

/// Scale applied to token-based scores so an exact match still wins.
const UNBASE_SCALE: f64 = 0.95;

/// Scale applied to partial scores when one string is much longer.
const PARTIAL_SCALE: f64 = 0.90;

/// Partial scale used when the length ratio exceeds [`LONG_RATIO`].
const LONG_PARTIAL_SCALE: f64 = 0.60;

/// Below this length ratio partial matching is not tried.
const PARTIAL_RATIO: f64 = 1.5;

/// Above this length ratio partial matches are trusted even less.
const LONG_RATIO: f64 = 8.0;

/// Normalize a string for scoring.
///
/// Non-alphanumeric characters become spaces, letters are lowercased, and
/// surrounding whitespace is trimmed.
#[must_use]
pub fn process(s: &str) -> String {
    let mapped: String = s
        .chars()
        .flat_map(|c| {
            let c = if c.is_alphanumeric() { c } else { ' ' };
            c.to_lowercase()
        })
        .collect();
    mapped.trim().to_string()
}

/// Plain similarity ratio: `2 * LCS / (len_a + len_b)` as a percentage.
///
/// Either string being empty scores 0.
#[must_use]
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best [`ratio`] of the shorter string against any equally long window of
/// the longer one.
#[must_use]
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if short.is_empty() {
        return 0;
    }

    let mut best = 0;
    for window in long.windows(short.len()) {
        best = best.max(ratio_chars(short, window));
        if best == 100 {
            break;
        }
    }
    best
}

/// Ratio of the two strings after sorting their whitespace-separated tokens.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Ratio based on the shared and differing token sets of the two strings.
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    token_set_with(a, b, ratio)
}

/// Weighted ratio of `a` and `b`, both normalized with [`process`] first.
///
/// Strings of similar length are compared whole and by tokens; when one is
/// at least half again as long as the other, substring matches are scored
/// too, at a discount.
#[must_use]
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let a = process(a);
    let b = process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = f64::from(ratio(&a, &b));
    let len_ratio = length_ratio(&a, &b);

    if len_ratio < PARTIAL_RATIO {
        let sorted = f64::from(token_sort_ratio(&a, &b)) * UNBASE_SCALE;
        let set = f64::from(token_set_ratio(&a, &b)) * UNBASE_SCALE;
        return round_score(base.max(sorted).max(set));
    }

    let scale = if len_ratio > LONG_RATIO {
        LONG_PARTIAL_SCALE
    } else {
        PARTIAL_SCALE
    };
    let partial = f64::from(partial_ratio(&a, &b)) * scale;
    let sorted =
        f64::from(partial_ratio(&sorted_tokens(&a), &sorted_tokens(&b))) * UNBASE_SCALE * scale;
    let set = f64::from(token_set_with(&a, &b, partial_ratio)) * UNBASE_SCALE * scale;

    round_score(base.max(partial).max(sorted).max(set))
}

/// Score every choice against `query` and keep the best `limit`.
///
/// Results are ordered by descending score; equal scores keep the order in
/// which the choices were given. Duplicate choices are scored separately.
#[must_use]
pub fn extract<'a, I>(query: &str, choices: I, limit: usize) -> Vec<(&'a str, u8)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(&'a str, u8)> = choices
        .into_iter()
        .map(|choice| (choice, weighted_ratio(query, choice)))
        .collect();
    // Stable, so ties stay in choice order.
    scored.sort_by(|x, y| y.1.cmp(&x.1));
    scored.truncate(limit);
    scored
}

fn ratio_chars(a: &[char], b: &[char]) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let common = lcs_len(a, b);
    #[allow(clippy::cast_precision_loss)]
    let score = 200.0 * common as f64 / (a.len() + b.len()) as f64;
    round_score(score)
}

/// Length of the longest common subsequence.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_set_with(a: &str, b: &str, score: fn(&str, &str) -> u8) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let sect = join(tokens_a.intersection(&tokens_b).copied());
    let only_a = join(tokens_a.difference(&tokens_b).copied());
    let only_b = join(tokens_b.difference(&tokens_a).copied());

    let with_a = format!("{sect} {only_a}").trim().to_string();
    let with_b = format!("{sect} {only_b}").trim().to_string();

    score(&sect, &with_a)
        .max(score(&sect, &with_b))
        .max(score(&with_a, &with_b))
}

fn join<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

#[allow(clippy::cast_precision_loss)]
fn length_ratio(a: &str, b: &str) -> f64 {
    let la = a.chars().count();
    let lb = b.chars().count();
    la.max(lb) as f64 / la.min(lb) as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process() {
        assert_eq!(process("  Smith, John! "), "smith  john");
        assert_eq!(process("O'Brien"), "o brien");
        assert_eq!(process("***"), "");
        assert_eq!(process("ÅSA"), "åsa");
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("jon", "john"), 86);
        assert_eq!(ratio("abc", "abc"), 100);
        assert_eq!(ratio("abc", "xyz"), 0);
        assert_eq!(ratio("", "abc"), 0);
    }

    #[test]
    fn test_partial_ratio() {
        assert_eq!(partial_ratio("jon", "jonathan"), 100);
        assert_eq!(partial_ratio("jonathan", "jon"), 100);
        assert_eq!(partial_ratio("", "jon"), 0);
        assert!(partial_ratio("xyz", "jonathan") < 50);
    }

    #[test]
    fn test_token_sort_ratio() {
        assert_eq!(token_sort_ratio("john smith", "smith john"), 100);
    }

    #[test]
    fn test_token_set_ratio() {
        assert_eq!(token_set_ratio("john smith", "john  smith smith"), 100);
        assert_eq!(token_set_ratio("jon", "zzz"), 0);
    }

    #[test]
    fn test_weighted_ratio_close_spelling() {
        assert_eq!(weighted_ratio("Jon", "John"), 86);
        assert_eq!(weighted_ratio("Jon", "Jhon"), 86);
    }

    #[test]
    fn test_weighted_ratio_prefix() {
        assert_eq!(weighted_ratio("Jon", "Jonathan"), 90);
    }

    #[test]
    fn test_weighted_ratio_unrelated() {
        assert_eq!(weighted_ratio("Jon", "Zzz"), 0);
        assert!(weighted_ratio("Jon", "Jan") < 70);
    }

    #[test]
    fn test_weighted_ratio_ignores_case() {
        assert_eq!(weighted_ratio("JOHN", "john"), 100);
    }

    #[test]
    fn test_weighted_ratio_ignores_word_order() {
        assert_eq!(weighted_ratio("john smith", "Smith, John"), 95);
    }

    #[test]
    fn test_weighted_ratio_very_long_choice() {
        let score = weighted_ratio("ann", "annabelle-marguerite-josephine");
        assert_eq!(score, 60);
    }

    #[test]
    fn test_weighted_ratio_empty_after_processing() {
        assert_eq!(weighted_ratio("!!!", "John"), 0);
        assert_eq!(weighted_ratio("John", ""), 0);
    }

    #[test]
    fn test_extract_keeps_top_scores() {
        let names = ["Zzz", "John", "Jonathan", "Jhon"];
        let top = extract("Jon", names, 2);
        assert_eq!(top, vec![("Jonathan", 90), ("John", 86)]);
    }

    #[test]
    fn test_extract_scores_duplicates_separately() {
        let names = ["John", "John", "Jonathan"];
        let top = extract("Jon", names, 2);
        assert_eq!(top, vec![("Jonathan", 90), ("John", 86)]);

        let top = extract("John", names, 2);
        assert_eq!(top, vec![("John", 100), ("John", 100)]);
    }

    #[test]
    fn test_extract_empty_choices() {
        let top = extract("Jon", std::iter::empty(), 2);
        assert!(top.is_empty());
    }
}
