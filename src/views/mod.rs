//! Server-rendered HTML pages.
//!
//! Every page is plain `format!` output wrapped by [`layout::page`]. Text that came from a
//! user (list names, task titles, comments) must pass through [`escape`] before it is
//! interpolated.

pub mod comments;
pub mod layout;
pub mod lists;
pub mod login;
pub mod tasks;

/// Escapes the five characters that are significant in HTML text and attribute values.
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
