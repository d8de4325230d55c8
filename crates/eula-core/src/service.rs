//! The agreement gate as a single service object.
//!
//! [`Eula`] wires the dialogue, policy, interceptor and prompt registry
//! together around the host's collaborators. A host needs three hooks:
//! call [`Eula::intercept`] before running a command, route every inbound
//! message through [`Eula::deliver_reply`], and call [`Eula::shutdown`] when
//! stopping.

use crate::admin::Admin;
use crate::dialogue::{ConsentDialogue, GateOutcome};
use crate::error::{GateResult, StoreResult};
use crate::events::{EventBus, GateEvent};
use crate::interceptor::{CommandInterceptor, Verdict};
use crate::localization::Localizer;
use crate::messaging::Messenger;
use crate::policy::{InterceptionPolicy, AGREEMENT_COMMAND};
use crate::prompt::PromptRegistry;
use crate::store::{ConsentStore, RecordStore};
use crate::types::{CommandRef, Invocation, Session, UserId};
use eula_config::{AgreementConfig, ConfigError};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct Eula {
    config: Arc<AgreementConfig>,
    store: ConsentStore,
    dialogue: Arc<ConsentDialogue>,
    interceptor: CommandInterceptor,
    prompts: PromptRegistry,
    events: EventBus,
    shutdown: CancellationToken,
}

impl Eula {
    /// Build the gate. The configuration is validated first.
    pub fn new(
        config: AgreementConfig,
        records: Arc<dyn RecordStore>,
        messenger: Arc<dyn Messenger>,
        localizer: Arc<dyn Localizer>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let config = Arc::new(config);
        let store = ConsentStore::new(records);
        let prompts = PromptRegistry::new();
        let events = EventBus::default();
        let shutdown = CancellationToken::new();

        let dialogue = Arc::new(
            ConsentDialogue::new(config.clone(), store.clone(), messenger, localizer)
                .with_prompts(prompts.clone())
                .with_events(events.clone())
                .with_shutdown(shutdown.clone()),
        );
        let interceptor = CommandInterceptor::new(
            InterceptionPolicy::from_config(&config),
            store.clone(),
            dialogue.clone(),
            events.clone(),
        );

        info!(
            alias = %config.alias,
            wait_time = config.wait_time,
            reply_authority = config.reply_authority,
            "Agreement gate ready"
        );

        Ok(Self {
            config,
            store,
            dialogue,
            interceptor,
            prompts,
            events,
            shutdown,
        })
    }

    /// Declaration of the built-in agreement command. It needs no authority
    /// and is never gated.
    pub fn command() -> CommandRef {
        CommandRef::new(AGREEMENT_COMMAND, 0)
    }

    pub fn config(&self) -> &AgreementConfig {
        &self.config
    }

    /// Pre-execution hook. See [`CommandInterceptor::before_execute`].
    pub async fn intercept(&self, invocation: &Invocation) -> GateResult<Verdict> {
        self.interceptor.before_execute(invocation).await
    }

    /// The explicit agreement command: runs a dialogue regardless of the
    /// user's current status.
    pub async fn agreement_command(&self, session: &Session) -> GateResult<GateOutcome> {
        debug!(user = %session.user, channel = %session.channel, "Agreement requested explicitly");
        self.dialogue.converse(session).await
    }

    /// Offer an inbound message to the prompt pending for its sender.
    ///
    /// Returns `true` if the message was the reply to a prompt and must not
    /// be handled further by the host.
    pub fn deliver_reply(&self, session: &Session, text: &str) -> bool {
        self.prompts.deliver(&session.key(), text)
    }

    /// Abandon the prompt pending for `session`, e.g. when the user left the
    /// channel. Nothing is recorded and no further message is sent.
    ///
    /// Returns `false` if no prompt was waiting for this session.
    pub fn cancel_prompt(&self, session: &Session) -> bool {
        let cancelled = self.prompts.cancel(&session.key());
        if cancelled {
            info!(user = %session.user, channel = %session.channel, "Agreement prompt abandoned");
        }
        cancelled
    }

    /// Whether the user has accepted.
    pub async fn verify(&self, user: UserId) -> StoreResult<bool> {
        self.store.is_accepted(user).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent> {
        self.events.subscribe()
    }

    /// Cancel every pending wait. Interrupted dialogues record nothing.
    pub fn shutdown(&self) {
        info!(pending = self.prompts.len(), "Shutting down agreement gate");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn admin(&self) -> Admin {
        Admin::new(self.store.clone())
    }

    /// Number of prompts currently waiting for a reply.
    pub fn pending_prompts(&self) -> usize {
        self.prompts.len()
    }
}
