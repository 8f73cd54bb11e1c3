//! "Did you mean" suggestions for unknown field names.
//!
//! Suggestions are only ever reported back; an unknown name is never resolved to
//! a near match automatically.

use crate::definition::ContractDefinition;

const MAX_SUGGESTIONS: usize = 5;
const MIN_SIMILARITY: f64 = 0.6;

/// Field names of `def` that look like `input`, best first.
///
/// Names equal to the input after normalization (case, whitespace, separators
/// and punctuation ignored) come first, then names whose edit-distance
/// similarity is at least 0.6. Ties keep declaration order.
pub fn suggest_field_names(def: &ContractDefinition, input: &str) -> Vec<String> {
    let wanted = normalize(input);
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, usize, &str)> = def
        .fields()
        .iter()
        .enumerate()
        .filter_map(|(order, field)| {
            let candidate = normalize(&field.name);
            let score = if candidate == wanted {
                2.0
            } else {
                similarity(&wanted, &candidate)
            };
            (score >= MIN_SIMILARITY).then_some((score, order, field.name.as_str()))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, _, name)| name.to_string())
        .collect()
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| {
            !c.is_whitespace()
                && !c.is_ascii_punctuation()
                && !matches!(c, '☐' | '☑' | '（' | '）' | '、' | '，' | '。' | '：' | '；' | '《' | '》')
        })
        .flat_map(char::to_lowercase)
        .collect()
}

fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Edit distance over chars, two rows at a time.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
