//! Decides whether an invocation must wait for consent.

use crate::types::{Authority, Invocation, UserRecord};
use eula_config::{AgreementConfig, CommandFilter};

/// Name of the built-in agreement command.
pub const AGREEMENT_COMMAND: &str = "eula";

/// Why an invocation was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bypass {
    /// The user has already accepted.
    Accepted,
    /// The command requires no authority.
    PublicCommand,
    /// The user's authority is above the gate threshold.
    PrivilegedUser,
    /// The command is the agreement command itself.
    AgreementCommand,
    /// The command filter excludes this command.
    Filtered,
}

/// Outcome of [`InterceptionPolicy::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Gate,
    Bypass(Bypass),
}

impl GateDecision {
    pub fn is_gate(&self) -> bool {
        matches!(self, GateDecision::Gate)
    }
}

/// Pure gating predicate.
#[derive(Debug, Clone)]
pub struct InterceptionPolicy {
    reply_authority: Authority,
    filter: CommandFilter,
    agreement_command: String,
}

impl InterceptionPolicy {
    pub fn new(reply_authority: Authority, filter: CommandFilter) -> Self {
        Self {
            reply_authority,
            filter,
            agreement_command: AGREEMENT_COMMAND.to_string(),
        }
    }

    pub fn from_config(config: &AgreementConfig) -> Self {
        Self::new(config.reply_authority, config.commands.clone())
    }

    /// Use a different name for the agreement command.
    pub fn with_agreement_command(mut self, name: impl Into<String>) -> Self {
        self.agreement_command = name.into();
        self
    }

    /// Gate iff the user has not accepted, the command is not public, the
    /// user is at or below the threshold, the command is not the agreement
    /// command, and the filter includes the command.
    pub fn evaluate(&self, invocation: &Invocation, user: &UserRecord) -> GateDecision {
        let command = &invocation.command;

        let bypass = if user.eula {
            Bypass::Accepted
        } else if command.is_public() {
            Bypass::PublicCommand
        } else if user.authority > self.reply_authority {
            Bypass::PrivilegedUser
        } else if command.name == self.agreement_command {
            Bypass::AgreementCommand
        } else if !self.filter.includes(&command.name) {
            Bypass::Filtered
        } else {
            return GateDecision::Gate;
        };

        GateDecision::Bypass(bypass)
    }

    pub fn should_gate(&self, invocation: &Invocation, user: &UserRecord) -> bool {
        self.evaluate(invocation, user).is_gate()
    }
}
