/// Pure utility functions for user-supplied offer text
///
/// No I/O here: inputs in, outputs out.

/// Escape free text so HTML-rendering clients show it literally.
///
/// `&` goes first so already-produced entities are not escaped twice.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Trim and escape an optional field; blank input becomes `None`.
pub fn clean_text(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(escape_html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_script_tag() {
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_ampersand_escaped_once() {
        assert_eq!(escape_html("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape_html("a \"quoted\" flat"), "a &quot;quoted&quot; flat");
    }

    #[test]
    fn test_clean_text_blank_is_none() {
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(None), None);
        assert_eq!(clean_text(Some(" Lenina 5 ")), Some("Lenina 5".to_string()));
    }
}
