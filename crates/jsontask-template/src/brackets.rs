//! Angle-bracket placeholder rewriting.
//!
//! Templates authored for JSON-heavy payloads use `[[name]]` placeholders so
//! the template text can contain literal `{{` and `}}`. Rewriting turns each
//! unescaped `[[name]]` into `{{name}}`. A single backslash in front keeps
//! the placeholder literal and is itself removed; a double backslash keeps
//! one backslash and the literal placeholder.

use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[[^\[\]]*\]\]").expect("placeholder pattern is valid")
});

/// Rewrite `[[name]]` placeholders to `{{name}}`, honoring backslash escapes.
#[must_use]
pub fn angle_to_curly(template: &str) -> String {
    let mut output = String::with_capacity(template.len());
    let mut last = 0;
    for found in PLACEHOLDER_RE.find_iter(template) {
        let before = &template[last..found.start()];
        if before.ends_with('\\') {
            // One backslash escapes the placeholder, two escape the
            // backslash itself; either way one backslash is consumed and
            // the placeholder stays literal.
            output.push_str(&before[..before.len() - 1]);
            output.push_str(found.as_str());
        } else {
            output.push_str(before);
            let inner = &found.as_str()[2..found.as_str().len() - 2];
            output.push_str("{{");
            output.push_str(inner);
            output.push_str("}}");
        }
        last = found.end();
    }
    output.push_str(&template[last..]);
    output
}
