//! String similarity scores in [0, 100].
//!
//! `ratio` is the Indel-normalized similarity from `rapidfuzz`; the token
//! variants reshape their inputs before delegating to it.

use std::collections::BTreeSet;

use rapidfuzz::fuzz;

/// Character-level similarity of two strings taken literally.
pub fn ratio(a: &str, b: &str) -> u8 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 100,
        (true, false) | (false, true) => 0,
        (false, false) => to_percent(fuzz::ratio(a.chars(), b.chars())),
    }
}

/// Similarity after sorting each side's whitespace tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Similarity based on token-set overlap; a side whose tokens are a subset of
/// the other's scores 100.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();

    match (set_a.is_empty(), set_b.is_empty()) {
        (true, true) => return 100,
        (true, false) | (false, true) => return 0,
        (false, false) => {}
    }

    let intersection = join(set_a.intersection(&set_b));
    let only_a = join(set_a.difference(&set_b));
    let only_b = join(set_b.difference(&set_a));

    let combined_a = join_nonempty(&intersection, &only_a);
    let combined_b = join_nonempty(&intersection, &only_b);

    // An empty intersection would score 0 against anything; skip those pairs.
    let mut best = ratio(&combined_a, &combined_b);
    if !intersection.is_empty() {
        best = best
            .max(ratio(&intersection, &combined_a))
            .max(ratio(&intersection, &combined_b));
    }
    best
}

fn to_percent(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn join_nonempty(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{left} {right}"),
    }
}
