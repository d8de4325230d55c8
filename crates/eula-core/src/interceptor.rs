//! Pre-execution hook for the host's command pipeline.

use crate::dialogue::{ConsentDialogue, GateOutcome};
use crate::error::GateResult;
use crate::events::{EventBus, GateEvent};
use crate::policy::{GateDecision, InterceptionPolicy};
use crate::store::ConsentStore;
use crate::types::Invocation;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the host must do with the intercepted invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Run the command normally.
    Proceed,
    /// Do not run the command. The dialogue has already replied to the user;
    /// after accepting they must issue the command again.
    Suppressed(GateOutcome),
}

impl Verdict {
    pub fn should_proceed(&self) -> bool {
        matches!(self, Verdict::Proceed)
    }
}

/// Hook the host calls before every command execution.
///
/// An `Err` from [`before_execute`](Self::before_execute) must also stop the
/// command; the gate state is unchanged in that case.
pub struct CommandInterceptor {
    policy: InterceptionPolicy,
    store: ConsentStore,
    dialogue: Arc<ConsentDialogue>,
    events: EventBus,
}

impl CommandInterceptor {
    pub fn new(
        policy: InterceptionPolicy,
        store: ConsentStore,
        dialogue: Arc<ConsentDialogue>,
        events: EventBus,
    ) -> Self {
        Self {
            policy,
            store,
            dialogue,
            events,
        }
    }

    pub fn policy(&self) -> &InterceptionPolicy {
        &self.policy
    }

    pub async fn before_execute(&self, invocation: &Invocation) -> GateResult<Verdict> {
        self.events.emit(GateEvent::Before {
            invocation: invocation.clone(),
        });

        let session = &invocation.session;
        let user = self.store.record(session.user).await.map_err(|err| {
            warn!(user = %session.user, error = %err, "Could not read user record, refusing command");
            err
        })?;

        match self.policy.evaluate(invocation, &user) {
            GateDecision::Bypass(reason) => {
                debug!(
                    command = %invocation.command.name,
                    user = %session.user,
                    ?reason,
                    "Command not gated"
                );
                Ok(Verdict::Proceed)
            }
            GateDecision::Gate => {
                info!(
                    command = %invocation.command.name,
                    user = %session.user,
                    channel = %session.channel,
                    "Command gated pending agreement"
                );
                let outcome = self.dialogue.converse(session).await?;
                Ok(Verdict::Suppressed(outcome))
            }
        }
    }
}
