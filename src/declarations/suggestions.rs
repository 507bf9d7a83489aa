//! "Did you mean?" suggestions for unresolved names.
//!
//! Candidates are ranked by Levenshtein distance. Ties keep the order in
//! which candidates were supplied, which callers make the declaration order.

use crate::Span;

/// Minimum length for the unresolved name to produce suggestions.
const MIN_NAME_LENGTH_FOR_SUGGESTIONS: usize = 2;

pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr_row: Vec<usize> = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_chars.len()]
}

/// Longer names tolerate more edits; very different lengths tolerate one.
fn compute_threshold(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len.abs_diff(b_len) > 2 {
        return 1;
    }

    match a_len.max(b_len) {
        0..=4 => 1,
        5..=7 => 2,
        _ => 3,
    }
}

/// Picks at most `max` names close to `unknown`. `candidates` must already
/// be in declaration order; duplicates are ignored.
pub fn suggest_similar<'a, I>(unknown: &str, candidates: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    if unknown.chars().count() < MIN_NAME_LENGTH_FOR_SUGGESTIONS {
        return vec![];
    }

    let mut ranked: Vec<(&str, usize)> = vec![];
    for name in candidates {
        if ranked.iter().any(|(seen, _)| *seen == name) {
            continue;
        }

        let distance = levenshtein_distance(unknown, name);
        if distance > 0 && distance <= compute_threshold(unknown, name) {
            ranked.push((name, distance));
        }
    }

    // Stable, so equal distances keep declaration order.
    ranked.sort_by_key(|(_, distance)| *distance);

    ranked
        .into_iter()
        .take(max)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// `unknown identifier 'x'. Did you mean 'a', 'b' or 'c'? At position: s-e`
pub fn format_unknown_identifier(name: &str, suggestions: &[String], span: &Span) -> String {
    let mut message = format!("unknown identifier '{}'.", name);

    if let Some((last, rest)) = suggestions.split_last() {
        let quoted = |s: &String| format!("'{}'", s);
        let alternatives = if rest.is_empty() {
            quoted(last)
        } else {
            format!(
                "{} or {}",
                rest.iter().map(quoted).collect::<Vec<_>>().join(", "),
                quoted(last)
            )
        };
        message.push_str(&format!(" Did you mean {}?", alternatives));
    }

    message.push_str(&format!(" At position: {}", span));
    message
}
