//! Escaping utilities for safe report generation.
//!
//! Questions, comments and evidence references are free text typed by
//! auditors or imported from spreadsheets. They may contain HTML or Markdown
//! syntax that would inject markup or break table layout, so every such
//! value is escaped before being embedded in a report.

/// Replace every character for which `map` returns a substitute.
fn escape_with(s: &str, map: impl Fn(char) -> Option<&'static str>) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match map(c) {
            Some(sub) => out.push_str(sub),
            None => out.push(c),
        }
    }
    out
}

fn html_entity(c: char) -> Option<&'static str> {
    Some(match c {
        '&' => "&amp;",
        '<' => "&lt;",
        '>' => "&gt;",
        '"' => "&quot;",
        '\'' => "&#x27;",
        _ => return None,
    })
}

/// Escape a string for safe inclusion in HTML content.
///
/// # Examples
///
/// ```
/// use audit_tools::reports::escape::escape_html;
///
/// assert_eq!(escape_html("<script>alert('xss')</script>"),
///     "&lt;script&gt;alert(&#x27;xss&#x27;)&lt;/script&gt;");
///
/// assert_eq!(escape_html("safe text"), "safe text");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    escape_with(s, html_entity)
}

/// Escape a string for safe inclusion in HTML attributes.
///
/// Stricter than content escaping: newlines and tabs are encoded too.
#[must_use]
pub fn escape_html_attr(s: &str) -> String {
    escape_with(s, |c| match c {
        '\n' => Some("&#10;"),
        '\r' => Some("&#13;"),
        '\t' => Some("&#9;"),
        _ => html_entity(c),
    })
}

/// Escape a string for safe inclusion in Markdown table cells.
///
/// # Examples
///
/// ```
/// use audit_tools::reports::escape::escape_markdown_table;
///
/// assert_eq!(escape_markdown_table("a | b"), "a \\| b");
/// assert_eq!(escape_markdown_table("line1\nline2"), "line1 line2");
/// ```
#[must_use]
pub fn escape_markdown_table(s: &str) -> String {
    escape_with(s, |c| match c {
        '|' => Some("\\|"),
        '\n' => Some(" "),
        '\r' => Some(""),
        '`' => Some("\\`"),
        '[' => Some("\\["),
        ']' => Some("\\]"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

/// Escape a string for safe inclusion in Markdown inline content.
#[must_use]
pub fn escape_markdown_inline(s: &str) -> String {
    escape_with(s, |c| match c {
        '\n' => Some(" "),
        '\r' => Some(""),
        _ => MARKDOWN_ESCAPED
            .iter()
            .find(|(k, _)| *k == c)
            .map(|(_, v)| *v),
    })
}

const MARKDOWN_ESCAPED: [(char, &str); 11] = [
    ('*', "\\*"),
    ('_', "\\_"),
    ('`', "\\`"),
    ('[', "\\["),
    (']', "\\]"),
    ('#', "\\#"),
    ('!', "\\!"),
    ('~', "\\~"),
    ('|', "\\|"),
    ('<', "\\<"),
    ('>', "\\>"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_basic() {
        assert_eq!(escape_html("hello"), "hello");
        assert_eq!(escape_html("R&D"), "R&amp;D");
        assert_eq!(escape_html("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_html("contrôle d'accès"), "contrôle d&#x27;accès");
    }

    #[test]
    fn test_escape_html_xss_vectors() {
        assert_eq!(
            escape_html("<img onerror=\"alert('xss')\">"),
            "&lt;img onerror=&quot;alert(&#x27;xss&#x27;)&quot;&gt;"
        );
        assert_eq!(escape_html("&lt;script&gt;"), "&amp;lt;script&amp;gt;");
    }

    #[test]
    fn test_escape_html_attr() {
        assert_eq!(escape_html_attr("MFA activé ?"), "MFA activé ?");
        assert_eq!(escape_html_attr("line1\nline2"), "line1&#10;line2");
        assert_eq!(escape_html_attr("a\t\"b\""), "a&#9;&quot;b&quot;");
    }

    #[test]
    fn test_escape_markdown_table_malicious() {
        assert_eq!(
            escape_markdown_table("row1\n| new | row |"),
            "row1 \\| new \\| row \\|"
        );
        assert_eq!(
            escape_markdown_table("[evil](http://malware.example)"),
            "\\[evil\\](http://malware.example)"
        );
        assert_eq!(escape_markdown_table("<b>"), "&lt;b&gt;");
    }

    #[test]
    fn test_escape_markdown_inline() {
        assert_eq!(escape_markdown_inline("**bold**"), "\\*\\*bold\\*\\*");
        assert_eq!(escape_markdown_inline("# heading"), "\\# heading");
        assert_eq!(escape_markdown_inline("Conformité & éthique"), "Conformité & éthique");
    }
}
