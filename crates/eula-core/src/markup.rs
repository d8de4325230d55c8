//! Minimal message markup.
//!
//! Chat transports deliver replies as text interleaved with structured
//! elements such as mentions (`<at id="123"/>`) or images. Text is escaped
//! (`&lt;`, `&amp;`, ...) so a raw `<` always opens an element. Only the flat
//! element sequence is needed here; closing tags are dropped.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^<([A-Za-z][\w:-]*)((?:\s+[\w:-]+(?:="[^"]*")?)*)\s*/?>$"#).expect("tag regex")
});

static ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([\w:-]+)="([^"]*)""#).expect("attr regex"));

/// A parsed piece of message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Text(String),
    Tag {
        name: String,
        attrs: Vec<(String, String)>,
    },
}

impl Element {
    /// Attribute value of a tag element.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Element::Tag { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            Element::Text(_) => None,
        }
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        matches!(self, Element::Tag { name, .. } if name == tag)
    }

    /// Text nodes containing only whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, Element::Text(text) if text.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("Unterminated element at byte {0}")]
    Unterminated(usize),

    #[error("Malformed element `{0}`")]
    Malformed(String),
}

/// Split content into text and element nodes.
pub fn parse(content: &str) -> Result<Vec<Element>, MarkupError> {
    let mut elements = Vec::new();
    let mut rest = content;
    let mut offset = 0;

    while let Some(start) = rest.find('<') {
        if start > 0 {
            elements.push(Element::Text(unescape(&rest[..start])));
        }

        let Some(len) = rest[start..].find('>') else {
            return Err(MarkupError::Unterminated(offset + start));
        };
        let raw = &rest[start..=start + len];

        if !raw.starts_with("</") {
            let captures = TAG_REGEX
                .captures(raw)
                .ok_or_else(|| MarkupError::Malformed(raw.to_string()))?;
            let attrs = captures
                .get(2)
                .map(|m| {
                    ATTR_REGEX
                        .captures_iter(m.as_str())
                        .map(|c| (c[1].to_string(), unescape(&c[2])))
                        .collect()
                })
                .unwrap_or_default();
            elements.push(Element::Tag {
                name: captures[1].to_string(),
                attrs,
            });
        }

        offset += start + len + 1;
        rest = &rest[start + len + 1..];
    }

    if !rest.is_empty() {
        elements.push(Element::Text(unescape(rest)));
    }

    Ok(elements)
}

/// Escape text for embedding in markup.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Reverse of [`escape`].
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(parse("hello").unwrap(), vec![Element::Text("hello".into())]);
    }

    #[test]
    fn test_empty_content() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_mention_then_text() {
        let elements = parse(r#"<at id="42"/> yes"#).unwrap();
        assert_eq!(elements.len(), 2);
        assert!(elements[0].is_tag("at"));
        assert_eq!(elements[0].attr("id"), Some("42"));
        assert_eq!(elements[1], Element::Text(" yes".into()));
    }

    #[test]
    fn test_closing_tags_dropped() {
        let elements = parse("<b>bold</b>").unwrap();
        assert_eq!(elements.len(), 2);
        assert!(elements[0].is_tag("b"));
        assert_eq!(elements[1], Element::Text("bold".into()));
    }

    #[test]
    fn test_entities_unescaped() {
        let elements = parse("a &lt;b&gt; &amp; c").unwrap();
        assert_eq!(elements, vec![Element::Text("a <b> & c".into())]);
    }

    #[test]
    fn test_unterminated_element() {
        assert_eq!(parse("yes <at id"), Err(MarkupError::Unterminated(4)));
    }

    #[test]
    fn test_malformed_element() {
        assert!(matches!(parse("< >"), Err(MarkupError::Malformed(_))));
    }

    #[test]
    fn test_escape_round_trip() {
        let text = r#"<"a" & b>"#;
        assert_eq!(unescape(&escape(text)), text);
    }
}
