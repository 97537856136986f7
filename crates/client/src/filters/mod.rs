//! Element-hiding rule extraction.
//!
//! Only the plain `domain##selector` form is understood. Exception rules
//! (`#@#`), extended CSS (`#?#`, `##+`), scriptlets and network rules are
//! dropped without error.

use cosmetic_core::SelectorSet;

/// Comment marker at the start of a filter list line.
const COMMENT_MARKER: char = '!';

/// Separator between the domain part and the selector.
const HIDING_SEPARATOR: &str = "##";

/// AdGuard extended-syntax marker; rules carrying it are skipped.
const EXTENDED_MARKER: &str = "##+";

/// Extract the selector from a single filter list line.
///
/// Returns the trimmed text after the first `##`, or `None` when the line
/// is blank, a comment, extended syntax, lacks the separator, or has an
/// empty selector.
pub fn parse_line(line: &str) -> Option<&str> {
    let line = line.trim();

    if line.is_empty() || line.starts_with(COMMENT_MARKER) || line.contains(EXTENDED_MARKER) {
        return None;
    }

    let (_, selector) = line.split_once(HIDING_SEPARATOR)?;
    let selector = selector.trim();

    if selector.is_empty() { None } else { Some(selector) }
}

/// Extract every plain element-hiding selector from a filter list.
///
/// Output preserves line order and keeps duplicates.
pub fn parse_selectors(text: &str) -> SelectorSet {
    text.lines().filter_map(parse_line).map(str::to_string).collect()
}
