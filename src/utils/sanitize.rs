//! Abstract text cleanup.
//!
//! Abstracts arrive as HTML snippets (Google Scholar), JATS XML (Crossref) or
//! plain text with stray entities. [`sanitize`] reduces all of them to a
//! single line of plain prose.

use quick_xml::escape::{resolve_html5_entity, resolve_predefined_entity, unescape_with};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").expect("valid regex")
});

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,;?!-]").expect("valid regex"));

/// Sanitize an optional abstract.
///
/// Returns `None` for missing or empty input. Otherwise tags are removed,
/// entities decoded, whitespace collapsed, characters other than word
/// characters, whitespace and `.,;?!-` dropped, and the result trimmed.
/// The result may be empty when the input held nothing but markup.
pub fn sanitize(text: Option<&str>) -> Option<String> {
    match text {
        Some(text) if !text.is_empty() => Some(clean(text)),
        _ => None,
    }
}

/// Clean a piece of abstract text. Never fails.
pub fn clean(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, "");
    let decoded = decode_entities(&without_tags);
    let collapsed = WHITESPACE_RE.replace_all(&decoded, " ");
    let filtered = DISALLOWED_RE.replace_all(&collapsed, "");
    // Dropping a character between two spaces leaves a double space
    WHITESPACE_RE.replace_all(&filtered, " ").trim().to_string()
}

/// Decode HTML character references (`&amp;`, `&eacute;`, `&#8211;`, ...).
///
/// Each reference is decoded on its own. Unknown names, invalid code points
/// and bare `&` stay as written.
fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let reference = &caps[0];
            unescape_with(reference, |name| {
                resolve_predefined_entity(name).or_else(|| resolve_html5_entity(name))
            })
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| reference.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty() {
        assert_eq!(sanitize(None), None);
        assert_eq!(sanitize(Some("")), None);
    }

    #[test]
    fn test_strips_markup() {
        let cleaned = clean("<jats:p>We study <i>graphs</i> and <b>trees</b>.</jats:p>");
        assert_eq!(cleaned, "We study graphs and trees.");
        assert!(!cleaned.contains('<'));
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(clean("Caf&eacute; &amp; bar"), "Café bar");
        assert_eq!(clean("pre&#8211;post"), "prepost");
        assert_eq!(clean("it&#39;s fine"), "its fine");
        assert_eq!(clean("non&nbsp;breaking"), "non breaking");
    }

    #[test]
    fn test_escaped_markup_is_removed() {
        assert_eq!(clean("a &lt;b&gt;bold&lt;/b&gt; claim"), "a bboldb claim");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(clean("  one\n\ttwo   three \r\n"), "one two three");
    }

    #[test]
    fn test_keeps_allowed_punctuation() {
        assert_eq!(
            clean("Does it work? Yes; well, mostly - really!"),
            "Does it work? Yes; well, mostly - really!"
        );
        assert_eq!(clean("x = (a + b) / 2 @ 100%"), "x a b 2 100");
    }

    #[test]
    fn test_keeps_unicode_words() {
        assert_eq!(clean("Über die Größe von π"), "Über die Größe von π");
    }

    #[test]
    fn test_markup_only_becomes_empty() {
        assert_eq!(sanitize(Some("<p></p>")), Some(String::new()));
    }

    #[test]
    fn test_unterminated_tag_degrades_gracefully() {
        let cleaned = clean("value < 5 and <unclosed");
        assert!(!cleaned.contains('<'));
        assert!(cleaned.starts_with("value 5 and"));
    }

    #[test]
    fn test_entities_do_not_truncate_after_stray_angle() {
        assert_eq!(
            clean("We show R&amp;D that x <y holds for all inputs"),
            "We show RD that x y holds for all inputs"
        );
        assert_eq!(
            clean("We show that x <y holds for all inputs"),
            "We show that x y holds for all inputs"
        );
    }

    #[test]
    fn test_unknown_entities_kept_as_text() {
        assert_eq!(clean("A&notanentity;B"), "AnotanentityB");
        assert_eq!(clean("fish & chips &amp; peas"), "fish chips peas");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "<p>Deep &amp; wide networks</p>",
            "a & b",
            "Tabs\tand\nnewlines — with dashes",
            "Already clean text.",
            "<div>&lt;tag&gt; &quot;quoted&quot;</div>",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "not idempotent for {:?}", input);
        }
    }
}
