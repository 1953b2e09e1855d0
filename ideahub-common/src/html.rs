//! HTML content rules for page fragments

use once_cell::sync::Lazy;
use regex::Regex;

static H1_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<h1(\s[^>]*)?>.*?</h1\s*>").expect("static h1 pattern is valid")
});

/// Whether the fragment contains a complete `<h1>` element.
///
/// Case-insensitive, attributes allowed, and the heading text may span lines.
pub fn has_h1(content: &str) -> bool {
    H1_ELEMENT.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_heading() {
        assert!(has_h1("<h1>Overview</h1><p>Body</p>"));
    }

    #[test]
    fn test_heading_variants() {
        assert!(has_h1("<H1 class=\"title\">Overview</H1>"));
        assert!(has_h1("<p>intro</p>\n<h1>\n  Multi\n  line\n</h1>"));
    }

    #[test]
    fn test_missing_heading() {
        assert!(!has_h1("<h2>Overview</h2><p>Body</p>"));
        assert!(!has_h1("<h1>unterminated"));
        assert!(!has_h1("<h10>not a heading</h10>"));
        assert!(!has_h1(""));
    }
}
