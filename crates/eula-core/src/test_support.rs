//! Test doubles for the host collaborators.

use crate::error::{MessagingError, StoreError, StoreResult};
use crate::messaging::{AgreementMessage, Messenger, OutboundMessage};
use crate::store::RecordStore;
use crate::types::{Authority, ChannelId, UserId, UserPatch, UserRecord};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Messenger that records everything it is asked to send.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(ChannelId, OutboundMessage)>>,
    notify: Notify,
    fail: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A messenger whose sends always fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(ChannelId, OutboundMessage)> {
        self.sent.lock().clone()
    }

    /// Contents of plain text messages, in order.
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|(_, m)| match m {
                OutboundMessage::Text { content } => Some(content.clone()),
                OutboundMessage::Agreement(_) => None,
            })
            .collect()
    }

    /// Agreement presentations, in order.
    pub fn agreements(&self) -> Vec<AgreementMessage> {
        self.sent
            .lock()
            .iter()
            .filter_map(|(_, m)| match m {
                OutboundMessage::Agreement(a) => Some(a.clone()),
                OutboundMessage::Text { .. } => None,
            })
            .collect()
    }

    /// Wait until at least `count` agreements have been sent and return the
    /// latest one.
    pub async fn wait_for_agreements(&self, count: usize) -> AgreementMessage {
        loop {
            let notified = self.notify.notified();
            let agreements = self.agreements();
            if agreements.len() >= count {
                if let Some(last) = agreements.into_iter().last() {
                    return last;
                }
            }
            notified.await;
        }
    }

    /// Wait for the first agreement presentation.
    pub async fn wait_for_agreement(&self) -> AgreementMessage {
        self.wait_for_agreements(1).await
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, channel: &ChannelId, message: OutboundMessage) -> Result<(), MessagingError> {
        if self.fail {
            return Err(MessagingError::Send("transport down".to_string()));
        }
        self.sent.lock().push((channel.clone(), message));
        self.notify.notify_waiters();
        Ok(())
    }
}

/// Record store that is always unavailable.
#[derive(Debug, Default)]
pub struct UnavailableStore;

#[async_trait]
impl RecordStore for UnavailableStore {
    async fn get(&self, _user: UserId) -> StoreResult<Option<UserRecord>> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn set(&self, _user: UserId, _patch: UserPatch) -> StoreResult<UserRecord> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn find_by_authority(&self, _authority: Authority) -> StoreResult<Vec<UserRecord>> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}
