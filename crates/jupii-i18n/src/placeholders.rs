//! Qt-style `%` markers in translated text.
//!
//! Positional markers are `%1` .. `%99`, optionally localized as `%L1`.
//! Plural messages additionally use `%n` (plain count) and `%Ln` (count
//! with locale digit grouping).
//!
//! Substitution is single-pass: text inserted for one marker is never
//! scanned for further markers. Markers without a matching argument are
//! left as-is.

/// Replace positional markers with `args` (`%1` is `args[0]`).
#[must_use]
pub fn apply_args(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match parse_marker(after) {
            Some((number, len)) if number <= args.len() => {
                out.push_str(args[number - 1]);
                rest = &after[len..];
            }
            _ => {
                out.push('%');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Replace `%n` with `count` and `%Ln` with `count` grouped for `language`.
#[must_use]
pub fn substitute_count(template: &str, count: i64, language: &str) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut rest = template;
    let plain = count.to_string();
    let mut grouped: Option<String> = None;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if let Some(tail) = after.strip_prefix('n') {
            out.push_str(&plain);
            rest = tail;
        } else if let Some(tail) = after.strip_prefix("Ln") {
            let text = grouped
                .get_or_insert_with(|| group_digits(count, digit_group_separator(language)));
            out.push_str(text);
            rest = tail;
        } else {
            out.push('%');
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

/// Sorted, deduplicated positional marker numbers used in `text`.
#[must_use]
pub fn placeholders(text: &str) -> Vec<usize> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find('%') {
        let after = &rest[pos + 1..];
        match parse_marker(after) {
            Some((number, len)) => {
                found.push(number);
                rest = &after[len..];
            }
            None => rest = after,
        }
    }
    found.sort_unstable();
    found.dedup();
    found
}

/// Whether `text` refers to the plural count.
#[must_use]
pub fn uses_count(text: &str) -> bool {
    text.contains("%n") || text.contains("%Ln")
}

/// Digit-group separator used by `%Ln` for a locale tag.
#[must_use]
pub fn digit_group_separator(language: &str) -> char {
    let language = language
        .split(['-', '_', '.', '@'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match language.as_str() {
        "de" | "nl" | "it" | "es" | "pt" | "da" | "id" | "tr" | "el" | "sl" | "hr" | "sr" => '.',
        "fr" | "ru" | "uk" | "pl" | "cs" | "sk" | "sv" | "nb" | "nn" | "fi" | "hu" | "bg" => {
            '\u{a0}'
        }
        _ => ',',
    }
}

/// Parse `L?` followed by one or two digits at the start of `s`.
///
/// Returns the marker number (never zero) and the bytes consumed.
fn parse_marker(s: &str) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let start = usize::from(bytes.first() == Some(&b'L'));
    let mut end = start;
    while end < bytes.len() && end - start < 2 && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == start {
        return None;
    }
    let number: usize = s[start..end].parse().ok()?;
    (number > 0).then_some((number, end))
}

fn group_digits(count: i64, separator: char) -> String {
    let digits = count.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if count < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
