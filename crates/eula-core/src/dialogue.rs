//! One round of agreement collection.
//!
//! A dialogue picks the keyword to display, sends the agreement, waits for a
//! single reply from the same user in the same channel, and records the
//! decision. The wait is the only suspension point and is bounded by the
//! configured deadline and the shutdown token.

use crate::error::{GateError, GateResult};
use crate::events::{EventBus, GateEvent};
use crate::localization::{keys, Localizer};
use crate::matcher::ReplyMatcher;
use crate::messaging::{AgreementMessage, Messenger, OutboundMessage};
use crate::prompt::PromptRegistry;
use crate::store::ConsentStore;
use crate::types::Session;
use eula_config::AgreementConfig;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Result of a completed dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub accepted: bool,
    /// The keyword that was shown and matched against.
    pub keyword: String,
}

/// What the user was told after a gated invocation or an explicit
/// agreement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Accepted,
    Rejected,
    TimedOut,
    /// Shutdown or an abandoned prompt ended the dialogue; nothing was
    /// recorded or sent.
    Cancelled,
    /// Another prompt for the same user and channel is still open.
    AlreadyPending,
}

/// Pick the keyword to display, uniformly among the configured ones.
pub fn choose_keyword<'a, R: Rng + ?Sized>(accept: &'a [String], rng: &mut R) -> Option<&'a str> {
    accept.choose(rng).map(String::as_str)
}

pub struct ConsentDialogue {
    config: Arc<AgreementConfig>,
    store: ConsentStore,
    messenger: Arc<dyn Messenger>,
    localizer: Arc<dyn Localizer>,
    prompts: PromptRegistry,
    events: EventBus,
    shutdown: CancellationToken,
}

impl ConsentDialogue {
    pub fn new(
        config: Arc<AgreementConfig>,
        store: ConsentStore,
        messenger: Arc<dyn Messenger>,
        localizer: Arc<dyn Localizer>,
    ) -> Self {
        Self {
            config,
            store,
            messenger,
            localizer,
            prompts: PromptRegistry::new(),
            events: EventBus::default(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptRegistry) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn prompts(&self) -> &PromptRegistry {
        &self.prompts
    }

    /// Keyword for the next prompt, falling back to the localized default
    /// when none is configured.
    pub fn keyword(&self) -> String {
        choose_keyword(&self.config.accept, &mut rand::rng())
            .map(str::to_string)
            .unwrap_or_else(|| self.localizer.text(keys::DEFAULT_ACCEPT, &[]))
    }

    /// The agreement presentation for `keyword`.
    pub fn presentation(&self, keyword: &str) -> AgreementMessage {
        let body = if self.config.body.trim().is_empty() {
            self.localizer.text(keys::TEXT, &[])
        } else {
            self.config.body.clone()
        };

        AgreementMessage {
            title: self.localizer.text(keys::TITLE, &[self.config.alias.as_str()]),
            body,
            confirm: self.localizer.text(keys::CONFIRM, &[keyword]),
            forward: self.config.forward_message,
        }
    }

    /// Run one dialogue and record the decision.
    ///
    /// Only the displayed keyword is accepted. On timeout or cancellation the
    /// stored consent is left untouched, and after shutdown no prompt is sent. The record write completes before
    /// this returns.
    pub async fn run(&self, session: &Session) -> GateResult<Decision> {
        if self.shutdown.is_cancelled() {
            debug!(user = %session.user, channel = %session.channel, "Gate shut down, not prompting");
            return Err(GateError::Cancelled);
        }

        let keyword = self.keyword();
        let mut pending = self.prompts.begin(session.key())?;

        self.messenger
            .send(
                &session.channel,
                OutboundMessage::Agreement(self.presentation(&keyword)),
            )
            .await?;

        let reply = pending
            .wait(self.config.wait_duration(), &self.shutdown)
            .await;

        let reply = match reply {
            Ok(reply) => {
                info!(
                    platform = %session.platform,
                    user = %session.user,
                    reply = %reply,
                    "User replied to agreement"
                );
                reply
            }
            Err(err) => {
                info!(
                    platform = %session.platform,
                    user = %session.user,
                    error = %err,
                    "Agreement prompt ended without reply"
                );
                return Err(err);
            }
        };

        let accepted = ReplyMatcher::new(&session.self_id)
            .matches(&reply, std::slice::from_ref(&keyword));
        self.store.set_accepted(session.user, accepted).await?;
        drop(pending);

        self.events.emit(GateEvent::Update {
            session: session.clone(),
            accepted,
        });

        Ok(Decision { accepted, keyword })
    }

    /// Run a dialogue and tell the user how it ended.
    pub async fn converse(&self, session: &Session) -> GateResult<GateOutcome> {
        let alias = self.config.alias.as_str();

        let (outcome, reply) = match self.run(session).await {
            Ok(Decision { accepted: true, .. }) => (
                GateOutcome::Accepted,
                Some(self.localizer.text(keys::ACCEPTED, &[alias])),
            ),
            Ok(Decision { accepted: false, .. }) => (
                GateOutcome::Rejected,
                Some(self.localizer.text(keys::REJECTED, &[alias])),
            ),
            Err(GateError::Timeout { .. }) => (
                GateOutcome::TimedOut,
                Some(self.localizer.text(keys::TIMEOUT, &[])),
            ),
            Err(GateError::ConcurrentPrompt(key)) => {
                debug!(%key, "Prompt already pending, not starting another");
                (
                    GateOutcome::AlreadyPending,
                    Some(self.localizer.text(keys::PENDING, &[])),
                )
            }
            Err(GateError::Cancelled) => (GateOutcome::Cancelled, None),
            Err(err) => return Err(err),
        };

        if let Some(text) = reply {
            self.messenger
                .send(&session.channel, OutboundMessage::text(text))
                .await?;
        }

        Ok(outcome)
    }
}
