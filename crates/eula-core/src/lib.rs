//! Agreement gate for a chat bot.
//!
//! Before a user may run gated commands they must accept an end-user
//! agreement. When an unaccepted user invokes such a command the invocation
//! is held back, the agreement is shown, and a single reply is awaited for a
//! bounded time. The reply decides the stored consent; the original command
//! is never resumed automatically.
//!
//! The host supplies three collaborators: a [`RecordStore`] holding user
//! records, a [`Messenger`] for outbound messages and a [`Localizer`] for
//! user-facing text. [`Eula`] ties everything together.

pub mod admin;
pub mod dialogue;
pub mod error;
pub mod events;
pub mod interceptor;
pub mod localization;
pub mod markup;
pub mod matcher;
pub mod messaging;
pub mod policy;
pub mod prompt;
pub mod service;
pub mod store;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use admin::{Admin, LEGACY_AGREED_AUTHORITY, REVISED_AUTHORITY};
pub use dialogue::{choose_keyword, ConsentDialogue, Decision, GateOutcome};
pub use error::{GateError, GateResult, MessagingError, StoreError, StoreResult};
pub use events::{EventBus, GateEvent};
pub use interceptor::{CommandInterceptor, Verdict};
pub use localization::{keys, Localizer, StaticLocalizer};
pub use matcher::{MalformedReply, ReplyMatcher};
pub use messaging::{AgreementMessage, Messenger, OutboundMessage};
pub use policy::{Bypass, GateDecision, InterceptionPolicy, AGREEMENT_COMMAND};
pub use prompt::{PendingPrompt, PromptRegistry};
pub use service::Eula;
pub use store::{ConsentRecord, ConsentStore, MemoryRecordStore, RecordStore};
pub use types::{
    Authority, ChannelId, CommandRef, Invocation, PromptKey, Session, UserId, UserPatch,
    UserRecord, DEFAULT_AUTHORITY,
};
