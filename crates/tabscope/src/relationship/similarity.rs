//! Column name and value-set similarity measures.

use std::collections::HashSet;
use std::hash::Hash;

/// Split a column name into lowercase tokens.
///
/// Separators (`_`, `-`, `.`, whitespace) and camelCase boundaries both split,
/// so `customerId`, `customer_id` and `Customer ID` all give `["customer", "id"]`.
pub fn name_tokens(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in name.trim().chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Canonical `snake_case` form of a column name.
pub fn normalize_name(name: &str) -> String {
    name_tokens(name).join("_")
}

/// Levenshtein edit distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// `1 - distance / longer length`, in `[0, 1]`.
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Jaccard similarity of two sets; two empty sets score 0.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.len() + b.len() - a.intersection(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Share of `part`'s elements that are also in `whole`.
pub fn containment<T: Eq + Hash>(whole: &HashSet<T>, part: &HashSet<T>) -> f64 {
    if part.is_empty() {
        return 0.0;
    }
    part.intersection(whole).count() as f64 / part.len() as f64
}

/// Name similarity: the better of normalized edit distance and token overlap.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<String> = name_tokens(a).into_iter().collect();
    let tokens_b: HashSet<String> = name_tokens(b).into_iter().collect();
    let edit = levenshtein_similarity(&normalize_name(a), &normalize_name(b));
    edit.max(jaccard(&tokens_a, &tokens_b))
}

/// Singular form of a table name, good enough for `customers -> customer`.
pub fn singular(table: &str) -> String {
    let name = normalize_name(table);
    if let Some(stem) = name.strip_suffix("ies") {
        format!("{stem}y")
    } else if name.ends_with("ss") {
        name
    } else if let Some(stem) = name.strip_suffix('s') {
        stem.to_string()
    } else {
        name
    }
}

/// `customers` + `id` gives `customer_id`.
pub fn qualified_name(table: &str, column: &str) -> String {
    format!("{}_{}", singular(table), normalize_name(column))
}

/// Similarity of two columns in different tables.
///
/// Each column name is also compared in its table-qualified form, so
/// `customers.id` matches `orders.customer_id`.
pub fn column_similarity(
    left_table: &str,
    left_column: &str,
    right_table: &str,
    right_column: &str,
) -> f64 {
    let plain = name_similarity(left_column, right_column);
    let left_qualified = name_similarity(&qualified_name(left_table, left_column), right_column);
    let right_qualified = name_similarity(left_column, &qualified_name(right_table, right_column));
    plain.max(left_qualified).max(right_qualified)
}
