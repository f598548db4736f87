//! Heading-to-slug normalization shared by the parser and section lookup.

/// Derive an identifier-safe slug from a heading's display text.
///
/// Lowercases, turns whitespace runs into single hyphens, drops every
/// character that is not alphanumeric or a hyphen, and trims hyphens at
/// both ends. Accented letters survive (`char::is_alphanumeric` is
/// Unicode-aware), which matters for the Spanish corpus.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_hyphen = false;
    for ch in title.to_lowercase().chars() {
        let mapped = if ch.is_whitespace() { '-' } else { ch };
        if mapped == '-' {
            if !last_hyphen {
                out.push('-');
                last_hyphen = true;
            }
        } else if mapped.is_alphanumeric() {
            out.push(mapped);
            last_hyphen = false;
        }
        // anything else is stripped
    }
    out.trim_matches('-').to_string()
}
