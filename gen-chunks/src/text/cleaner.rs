//! Whitespace normalization for extracted document text.

/// Collapse every run of whitespace into a single space and trim both ends.
///
/// Extractors leave newlines, tabs, form feeds between PDF pages and
/// non-breaking spaces scattered through the text; none of them carry meaning
/// for chunking.
pub fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if is_space(c) {
            // Leading whitespace never reaches the output
            pending_space = !result.is_empty();
        } else {
            if pending_space {
                result.push(' ');
                pending_space = false;
            }
            result.push(c);
        }
    }

    result
}

/// Unicode whitespace plus the ASCII information separators (U+001C..U+001F),
/// which some PDF producers emit between text runs.
fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}
