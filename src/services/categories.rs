//! Category name normalization and display formatting.

/// Canonical stored form of a category name: trimmed and lower-cased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Title-case every whitespace-delimited token, e.g. `"eating out"` → `"Eating Out"`.
pub fn display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;

    for c in name.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}
