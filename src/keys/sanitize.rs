//! Turning arbitrary resource keys into storage-safe path segments.

use regex::Regex;
use std::sync::LazyLock;

/// Anything outside word characters, `@`, `.` and `-` is dropped.
static UNSAFE_KEY_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w@.-]").expect("static regex is valid")
});

/// Replacements applied in a single left-to-right pass, first match wins.
const REPLACEMENTS: &[(&str, &str)] = &[
    (" ", "_"),
    ("+", "_plus_"),
    ("*", "wildcard_"),
    (":", "-"),
    ("..", ""),
];

/// Reduce `key` to a token that is safe as a single path segment.
///
/// The result is lower-case and contains no directory separators, so a key
/// such as `../../etc` cannot escape the directory it is placed in.
pub fn safe_key(key: &str) -> String {
    let lowered = key.to_lowercase();
    let replaced = replace_once(lowered.trim());
    let cleaned = UNSAFE_KEY_CHARS.replace_all(&replaced, "");
    // `\w` is Unicode-aware; keep the token ASCII so it is portable across
    // object stores.
    cleaned
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '.' | '-'))
        .collect()
}

fn replace_once(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    'outer: while let Some(c) = rest.chars().next() {
        for (from, to) in REPLACEMENTS {
            if let Some(tail) = rest.strip_prefix(from) {
                out.push_str(to);
                rest = tail;
                continue 'outer;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}
