//! Pending agreement prompts.
//!
//! A [`PendingPrompt`] exists for each dialogue in flight and is keyed by
//! `(user, channel)`. The host routes inbound messages through
//! [`PromptRegistry::deliver`]; a message is consumed only if a prompt for its
//! key is still waiting for a reply.

use crate::error::{GateError, GateResult};
use crate::types::PromptKey;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

struct PendingEntry {
    id: u64,
    /// Taken by the first delivered reply; the entry itself stays until the
    /// owning dialogue finishes so no second prompt can start meanwhile.
    reply_tx: Option<oneshot::Sender<String>>,
}

/// Registry of prompts awaiting a reply.
#[derive(Clone, Default)]
pub struct PromptRegistry {
    pending: Arc<DashMap<PromptKey, PendingEntry>>,
    next_id: Arc<AtomicU64>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the key for a new prompt.
    ///
    /// Fails with [`GateError::ConcurrentPrompt`] if a prompt for the same
    /// user and channel is still in flight.
    pub fn begin(&self, key: PromptKey) -> GateResult<PendingPrompt> {
        match self.pending.entry(key.clone()) {
            Entry::Occupied(_) => Err(GateError::ConcurrentPrompt(key)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let (reply_tx, reply_rx) = oneshot::channel();
                slot.insert(PendingEntry {
                    id,
                    reply_tx: Some(reply_tx),
                });
                debug!(%key, id, "Prompt pending");
                Ok(PendingPrompt {
                    key,
                    id,
                    registry: self.clone(),
                    reply_rx: Some(reply_rx),
                })
            }
        }
    }

    /// Hand an inbound message to the prompt waiting on `key`.
    ///
    /// Returns `true` if the message was consumed as the reply. Messages for
    /// keys without a waiting prompt, including replies that arrive after a
    /// timeout, return `false` and are left to normal handling.
    pub fn deliver(&self, key: &PromptKey, text: impl Into<String>) -> bool {
        let Some(mut entry) = self.pending.get_mut(key) else {
            trace!(%key, "No prompt pending, message not consumed");
            return false;
        };
        match entry.reply_tx.take() {
            Some(tx) => tx.send(text.into()).is_ok(),
            None => false,
        }
    }

    /// Abandon the prompt waiting on `key`, e.g. when the user leaves the
    /// channel. The waiter ends with [`GateError::Cancelled`]; the key stays
    /// reserved until the owning dialogue finishes.
    ///
    /// Returns `false` if no prompt was waiting for a reply.
    pub fn cancel(&self, key: &PromptKey) -> bool {
        let Some(mut entry) = self.pending.get_mut(key) else {
            return false;
        };
        let cancelled = entry.reply_tx.take().is_some();
        if cancelled {
            debug!(%key, id = entry.id, "Prompt cancelled");
        }
        cancelled
    }

    /// Whether a prompt is in flight for `key`.
    pub fn is_pending(&self, key: &PromptKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Number of prompts in flight.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn release(&self, key: &PromptKey, id: u64) {
        if self.pending.remove_if(key, |_, entry| entry.id == id).is_some() {
            debug!(%key, id, "Prompt released");
        }
    }
}

/// Reservation of a prompt key. Dropping it releases the key.
pub struct PendingPrompt {
    key: PromptKey,
    id: u64,
    registry: PromptRegistry,
    reply_rx: Option<oneshot::Receiver<String>>,
}

impl PendingPrompt {
    pub fn key(&self) -> &PromptKey {
        &self.key
    }

    /// Wait for the reply, bounded by `deadline` and `cancel`.
    ///
    /// Once this returns no further reply is accepted for the prompt. A reply
    /// that was handed over while the deadline fired still counts. The key
    /// stays reserved after this returns; it is released when the prompt is
    /// dropped.
    pub async fn wait(&mut self, deadline: Duration, cancel: &CancellationToken) -> GateResult<String> {
        let Some(mut reply_rx) = self.reply_rx.take() else {
            return Err(GateError::Cancelled);
        };

        let ended = tokio::select! {
            _ = cancel.cancelled() => GateError::Cancelled,
            result = tokio::time::timeout(deadline, &mut reply_rx) => match result {
                Ok(Ok(reply)) => return Ok(reply),
                // Sender dropped without a reply: cancelled or registry gone
                Ok(Err(_)) => GateError::Cancelled,
                Err(_) => GateError::Timeout {
                    seconds: deadline.as_secs(),
                },
            },
        };

        reply_rx.close();
        match (ended, reply_rx.try_recv()) {
            (GateError::Timeout { .. }, Ok(reply)) => {
                debug!(key = %self.key, "Reply arrived with the deadline");
                Ok(reply)
            }
            (ended, _) => Err(ended),
        }
    }
}

impl Drop for PendingPrompt {
    fn drop(&mut self) {
        self.registry.release(&self.key, self.id);
    }
}
