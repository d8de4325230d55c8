//! Error types for the agreement gate

use crate::types::PromptKey;
use thiserror::Error;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for gate operations
pub type GateResult<T> = Result<T, GateError>;

/// Failures of the record-store collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Record store backend error: {0}")]
    Backend(String),
}

/// Failures of the messaging collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    #[error("Failed to send message: {0}")]
    Send(String),
}

/// Errors raised while gating a command or running a dialogue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// No reply arrived before the deadline
    #[error("No reply within {seconds}s")]
    Timeout { seconds: u64 },

    /// The wait was cancelled by shutdown or the prompt was abandoned
    #[error("Agreement prompt cancelled")]
    Cancelled,

    /// A prompt is already pending for this user in this channel
    #[error("Agreement prompt already pending for {0}")]
    ConcurrentPrompt(PromptKey),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Messaging(#[from] MessagingError),
}

impl GateError {
    /// Whether the error ends the dialogue without any state change and is
    /// reported to the user as a normal reply rather than a failure.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Cancelled | Self::ConcurrentPrompt(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChannelId, UserId};

    #[test]
    fn test_benign_errors() {
        let key = PromptKey {
            user: UserId(1),
            channel: ChannelId::new("c"),
        };

        assert!(GateError::Timeout { seconds: 30 }.is_benign());
        assert!(GateError::Cancelled.is_benign());
        assert!(GateError::ConcurrentPrompt(key).is_benign());
        assert!(!GateError::Store(StoreError::Unavailable("down".into())).is_benign());
        assert!(!GateError::Messaging(MessagingError::Send("x".into())).is_benign());
    }

    #[test]
    fn test_store_error_converts() {
        let err: GateError = StoreError::Backend("disk".into()).into();
        assert_eq!(err.to_string(), "Record store backend error: disk");
    }
}
