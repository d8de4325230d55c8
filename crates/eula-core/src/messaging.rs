//! Outbound messaging contract.

use crate::error::MessagingError;
use crate::markup::escape;
use crate::types::ChannelId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The agreement presentation: a title followed by the body and the
/// confirmation instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementMessage {
    pub title: String,
    pub body: String,
    pub confirm: String,
    /// Presentation hint: deliver body and confirmation as one forwarded
    /// bundle. Transports without bundles ignore it.
    pub forward: bool,
}

impl AgreementMessage {
    /// Render as message markup.
    pub fn to_markup(&self) -> String {
        let bundle = if self.forward {
            "<message forward>"
        } else {
            "<message>"
        };
        format!(
            "<message>{}</message>{}<message>{}</message><message>{}</message></message>",
            escape(&self.title),
            bundle,
            escape(&self.body),
            escape(&self.confirm),
        )
    }

    /// Render as plain text, one part per paragraph.
    pub fn to_plain_text(&self) -> String {
        format!("{}\n\n{}\n\n{}", self.title, self.body, self.confirm)
    }
}

/// Message sent by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Text { content: String },
    Agreement(AgreementMessage),
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }
}

/// Sends messages through the host's transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, channel: &ChannelId, message: OutboundMessage) -> Result<(), MessagingError>;
}
