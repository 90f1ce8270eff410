//! Dotted version string comparison.
//!
//! Versions are split on `.`, `-`, `_`, `+` and on every digit/letter
//! boundary. Numeric parts compare numerically; textual parts rank
//! `dev < alpha|a < beta|b < RC|rc < # < pl|p`, where a bare number ranks as
//! `#`. Unknown words rank below `dev`.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Part {
    Number(u64),
    Text(String),
}

const SPECIAL_FORMS: [(&str, i32); 10] = [
    ("dev", 0),
    ("alpha", 1),
    ("a", 1),
    ("beta", 2),
    ("b", 2),
    ("RC", 3),
    ("rc", 3),
    ("#", 4),
    ("pl", 5),
    ("p", 5),
];

fn special_rank(text: &str) -> i32 {
    SPECIAL_FORMS
        .iter()
        .find(|(form, _)| text.starts_with(form))
        .map_or(-6, |(_, rank)| *rank)
}

fn flush(current: &mut String, is_digit: bool, parts: &mut Vec<Part>) {
    if current.is_empty() {
        return;
    }
    let part = if is_digit {
        current
            .parse()
            .map_or_else(|_| Part::Text(current.clone()), Part::Number)
    } else {
        Part::Text(current.clone())
    };
    parts.push(part);
    current.clear();
}

fn parts(version: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    for c in version.trim().chars() {
        if matches!(c, '.' | '-' | '_' | '+') {
            flush(&mut current, current_is_digit, &mut parts);
            continue;
        }
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != current_is_digit {
            flush(&mut current, current_is_digit, &mut parts);
        }
        current_is_digit = is_digit;
        current.push(c);
    }
    flush(&mut current, current_is_digit, &mut parts);
    parts
}

fn compare_parts(a: &Part, b: &Part) -> Ordering {
    match (a, b) {
        (Part::Number(x), Part::Number(y)) => x.cmp(y),
        (Part::Number(_), Part::Text(t)) => special_rank("#").cmp(&special_rank(t)),
        (Part::Text(t), Part::Number(_)) => special_rank(t).cmp(&special_rank("#")),
        (Part::Text(x), Part::Text(y)) => special_rank(x).cmp(&special_rank(y)),
    }
}

/// Compares two version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = parts(a);
    let right = parts(b);

    for (x, y) in left.iter().zip(right.iter()) {
        let ord = compare_parts(x, y);
        if ord.is_ne() {
            return ord;
        }
    }

    let trailing = |rest: &[Part]| -> Ordering {
        match rest.first() {
            None => Ordering::Equal,
            Some(Part::Number(_)) => Ordering::Greater,
            Some(Part::Text(t)) => special_rank(t).cmp(&special_rank("#")),
        }
    };

    match left.len().cmp(&right.len()) {
        Ordering::Equal => Ordering::Equal,
        Ordering::Greater => trailing(&left[right.len()..]),
        Ordering::Less => trailing(&right[left.len()..]).reverse(),
    }
}

/// Whether `version` is at least `floor`.
pub fn is_at_least(version: &str, floor: &str) -> bool {
    compare_versions(version, floor) != Ordering::Less
}
