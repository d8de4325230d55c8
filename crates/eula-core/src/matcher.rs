//! Reply normalization and keyword matching.

use crate::markup::{self, Element};
use thiserror::Error;

/// The reply could not be reduced to a text answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReply {
    #[error("reply markup is invalid: {0}")]
    Markup(#[from] markup::MarkupError),

    #[error("reply has no text content")]
    NoText,
}

/// Decides whether a raw reply confirms the agreement.
///
/// Normalization, in order:
/// 1. a leading mention of the bot itself is dropped, either as a structured
///    `<at id="..."/>` element or as a textual `@<self_id>` token;
/// 2. the first remaining node must be text, anything else is malformed;
/// 3. surrounding whitespace and a single leading `/` are removed.
///
/// The normalized text must then equal one expected keyword exactly
/// (case-sensitive).
#[derive(Debug, Clone)]
pub struct ReplyMatcher {
    self_id: String,
}

impl ReplyMatcher {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self {
            self_id: self_id.into(),
        }
    }

    /// Reduce a raw reply to the text that is compared against keywords.
    pub fn normalize(&self, raw: &str) -> Result<String, MalformedReply> {
        let mut elements = markup::parse(raw)?
            .into_iter()
            .skip_while(Element::is_blank)
            .peekable();

        if elements
            .peek()
            .is_some_and(|el| el.is_tag("at") && el.attr("id") == Some(self.self_id.as_str()))
        {
            elements.next();
        }

        let text = match elements.find(|el| !el.is_blank()) {
            Some(Element::Text(text)) => text,
            _ => return Err(MalformedReply::NoText),
        };

        let text = self.strip_text_mention(text.trim());
        let text = text.strip_prefix('/').unwrap_or(text);
        Ok(text.trim().to_string())
    }

    /// Whether `raw` confirms one of `expected`. Malformed or empty replies
    /// never match.
    pub fn matches<S: AsRef<str>>(&self, raw: &str, expected: &[S]) -> bool {
        match self.normalize(raw) {
            Ok(text) if !text.is_empty() => expected.iter().any(|k| k.as_ref() == text),
            _ => false,
        }
    }

    fn strip_text_mention<'a>(&self, text: &'a str) -> &'a str {
        let Some(rest) = text.strip_prefix('@') else {
            return text;
        };
        let (token, remainder) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        if token == self.self_id {
            remainder.trim_start()
        } else {
            text
        }
    }
}
