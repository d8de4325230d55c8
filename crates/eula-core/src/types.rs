//! Identifiers and invocation types shared across the gate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric privilege level of a user or a command.
pub type Authority = u32;

/// Authority given to users the store has never seen.
pub const DEFAULT_AUTHORITY: Authority = 1;

/// Stable user identifier as assigned by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Conversation channel identifier (group, direct chat, console, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    /// Create a channel id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key under which at most one agreement prompt may be pending.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PromptKey {
    pub user: UserId,
    pub channel: ChannelId,
}

impl fmt::Display for PromptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.channel)
    }
}

/// The conversation context a command or reply arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Invoking user.
    pub user: UserId,
    /// Channel the message arrived in.
    pub channel: ChannelId,
    /// Transport platform name, used for logging only.
    pub platform: String,
    /// The bot's own id on this platform.
    pub self_id: String,
}

impl Session {
    /// Create a session.
    pub fn new(
        user: UserId,
        channel: impl Into<String>,
        platform: impl Into<String>,
        self_id: impl Into<String>,
    ) -> Self {
        Self {
            user,
            channel: ChannelId::new(channel),
            platform: platform.into(),
            self_id: self_id.into(),
        }
    }

    /// Prompt key for this user in this channel.
    pub fn key(&self) -> PromptKey {
        PromptKey {
            user: self.user,
            channel: self.channel.clone(),
        }
    }
}

/// A command as declared by the host, with its authority already resolved
/// for the invoking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRef {
    pub name: String,
    pub authority: Authority,
}

impl CommandRef {
    pub fn new(name: impl Into<String>, authority: Authority) -> Self {
        Self {
            name: name.into(),
            authority,
        }
    }

    /// Commands with authority 0 are open to everyone.
    pub fn is_public(&self) -> bool {
        self.authority == 0
    }
}

/// One attempt to run a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub session: Session,
    pub command: CommandRef,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(session: Session, command: CommandRef) -> Self {
        Self {
            session,
            command,
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// The fields of a user record the gate reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub authority: Authority,
    /// Whether the user has accepted the agreement.
    pub eula: bool,
}

impl UserRecord {
    /// The record an unseen user implicitly has.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            authority: DEFAULT_AUTHORITY,
            eula: false,
        }
    }

    pub fn with_authority(mut self, authority: Authority) -> Self {
        self.authority = authority;
        self
    }

    pub fn with_eula(mut self, eula: bool) -> Self {
        self.eula = eula;
        self
    }
}

/// Partial update of a user record. `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub authority: Option<Authority>,
    pub eula: Option<bool>,
}

impl UserPatch {
    pub fn eula(accepted: bool) -> Self {
        Self {
            eula: Some(accepted),
            ..Default::default()
        }
    }

    pub fn authority(authority: Authority) -> Self {
        Self {
            authority: Some(authority),
            ..Default::default()
        }
    }

    /// Apply to an existing record.
    pub fn apply(&self, record: &mut UserRecord) {
        if let Some(authority) = self.authority {
            record.authority = authority;
        }
        if let Some(eula) = self.eula {
            record.eula = eula;
        }
    }
}
