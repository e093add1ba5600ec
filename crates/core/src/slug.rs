//! URL slug generation for record keys.

use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Turn a display name into a URL-safe slug.
///
/// Lowercases the input, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, and trims leading/trailing dashes.
///
/// # Examples
///
/// ```
/// use bizdir_core::slug::slugify;
/// assert_eq!(slugify("Five Diamonds"), "five-diamonds");
/// assert_eq!(slugify("  Tea & Toast! "), "tea-toast");
/// ```
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    NON_SLUG_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
