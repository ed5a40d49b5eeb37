//! `{{ placeholder }}` substitution.

use std::collections::HashMap;
use tracing::debug;

/// Replace every `{{ name }}` in `template` with its value.
///
/// Unknown names render empty. An unterminated `{{` is copied through.
pub fn render(template: &str, values: &HashMap<&str, String>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            output.push_str(&rest[start..]);
            return output;
        };

        let name = after_open[..end].trim();
        match values.get(name) {
            Some(value) => output.push_str(value),
            None => debug!("Template placeholder {{{{ {} }}}} has no value", name),
        }
        rest = &after_open[end + 2..];
    }

    output.push_str(rest);
    output
}

/// Escape text for safe inclusion in HTML content and attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
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
