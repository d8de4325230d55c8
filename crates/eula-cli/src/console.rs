//! Line-oriented console bot.
//!
//! Stands in for a chat platform: stdin lines are inbound messages from one
//! user in one channel, and everything the bot says is written to a terminal.
//! Every line is first offered to a pending agreement prompt; otherwise it
//! is parsed as one of a few built-in commands, which go through the
//! agreement gate before they run.

use async_trait::async_trait;
use colored::Colorize;
use eula_core::{
    ChannelId, CommandRef, Eula, Invocation, MessagingError, Messenger, OutboundMessage, Session,
    Verdict,
};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Commands the console bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinCommand {
    Help,
    Eula,
    Echo,
    Whoami,
}

impl BuiltinCommand {
    pub const ALL: [BuiltinCommand; 4] = [
        BuiltinCommand::Help,
        BuiltinCommand::Eula,
        BuiltinCommand::Echo,
        BuiltinCommand::Whoami,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinCommand::Help => "help",
            BuiltinCommand::Eula => eula_core::AGREEMENT_COMMAND,
            BuiltinCommand::Echo => "echo",
            BuiltinCommand::Whoami => "whoami",
        }
    }

    /// Declared authority. Zero means public.
    pub fn authority(&self) -> u32 {
        match self {
            BuiltinCommand::Help => 0,
            BuiltinCommand::Eula => Eula::command().authority,
            BuiltinCommand::Echo | BuiltinCommand::Whoami => 1,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    fn usage(&self) -> &'static str {
        match self {
            BuiltinCommand::Help => "help            list commands",
            BuiltinCommand::Eula => "eula            read and answer the agreement",
            BuiltinCommand::Echo => "echo <text>     repeat text",
            BuiltinCommand::Whoami => "whoami          show your stored record",
        }
    }
}

/// Split a line into a command and its arguments. A leading `/` is allowed.
pub fn parse_command(line: &str) -> Result<(BuiltinCommand, Vec<String>), String> {
    let line = line.trim();
    let line = line.strip_prefix('/').unwrap_or(line);
    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default();

    match BuiltinCommand::from_name(name) {
        Some(command) => Ok((command, parts.map(str::to_string).collect())),
        None => Err(name.to_string()),
    }
}

fn help_text() -> String {
    let mut text = String::from("Commands:");
    for command in BuiltinCommand::ALL {
        text.push_str("\n  ");
        text.push_str(command.usage());
    }
    text
}

/// How a console line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Empty,
    /// Consumed as the reply to a pending prompt.
    Reply,
    /// Dispatched as a command on its own task.
    Command(BuiltinCommand),
    Unknown(String),
}

/// The console bot: one user, one channel.
pub struct ConsoleHost {
    gate: Arc<Eula>,
    messenger: Arc<dyn Messenger>,
    session: Session,
    tasks: JoinSet<()>,
}

impl ConsoleHost {
    pub fn new(gate: Arc<Eula>, messenger: Arc<dyn Messenger>, session: Session) -> Self {
        Self {
            gate,
            messenger,
            session,
            tasks: JoinSet::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read lines until EOF, then shut down.
    pub async fn run<R>(mut self, reader: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            self.handle_line(&line).await;
        }
        debug!("Console input closed");
        self.shutdown().await;
        Ok(())
    }

    pub async fn handle_line(&mut self, line: &str) -> LineKind {
        let text = line.trim();
        if text.is_empty() {
            return LineKind::Empty;
        }

        if self.gate.deliver_reply(&self.session, text) {
            return LineKind::Reply;
        }

        match parse_command(text) {
            Ok((command, args)) => {
                let invocation = Invocation::new(
                    self.session.clone(),
                    CommandRef::new(command.name(), command.authority()),
                )
                .with_args(args);
                let gate = self.gate.clone();
                let messenger = self.messenger.clone();
                self.tasks
                    .spawn(dispatch(gate, messenger, invocation, command));
                LineKind::Command(command)
            }
            Err(name) => {
                self.say(format!("Unknown command: {}. Try help.", name))
                    .await;
                LineKind::Unknown(name)
            }
        }
    }

    /// Wait for every dispatched command to finish.
    pub async fn wait_idle(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(err) = result {
                warn!(error = %err, "Command task failed");
            }
        }
    }

    /// Cancel pending prompts and wait for running commands.
    pub async fn shutdown(&mut self) {
        self.gate.shutdown();
        self.wait_idle().await;
    }

    async fn say(&self, text: String) {
        if let Err(err) = self
            .messenger
            .send(&self.session.channel, OutboundMessage::text(text))
            .await
        {
            warn!(error = %err, "Failed to write console message");
        }
    }
}

async fn dispatch(
    gate: Arc<Eula>,
    messenger: Arc<dyn Messenger>,
    invocation: Invocation,
    command: BuiltinCommand,
) {
    let channel = invocation.session.channel.clone();
    let reply = match execute(&gate, &invocation, command).await {
        Ok(Some(output)) => output,
        Ok(None) => return,
        Err(err) => {
            warn!(command = command.name(), error = %err, "Command failed");
            format!("{} failed: {}", command.name(), err)
        }
    };

    if let Err(err) = messenger.send(&channel, OutboundMessage::text(reply)).await {
        warn!(error = %err, "Failed to write command output");
    }
}

async fn execute(
    gate: &Eula,
    invocation: &Invocation,
    command: BuiltinCommand,
) -> anyhow::Result<Option<String>> {
    if let Verdict::Suppressed(outcome) = gate.intercept(invocation).await? {
        debug!(command = command.name(), ?outcome, "Command suppressed by agreement gate");
        return Ok(None);
    }

    let output = match command {
        BuiltinCommand::Help => Some(help_text()),
        BuiltinCommand::Eula => {
            gate.agreement_command(&invocation.session).await?;
            None
        }
        BuiltinCommand::Echo => Some(invocation.args.join(" ")),
        BuiltinCommand::Whoami => {
            let record = gate.admin().status(invocation.session.user).await?;
            Some(format!(
                "user {} | authority {} | agreement {}",
                record.id,
                record.authority,
                if record.eula { "accepted" } else { "not accepted" }
            ))
        }
    };

    Ok(output)
}

/// [`Messenger`] writing to a terminal or any other writer.
pub struct ConsoleMessenger<W> {
    out: Mutex<W>,
}

impl ConsoleMessenger<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleMessenger<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

/// Terminal rendering of an outbound message.
pub fn render(message: &OutboundMessage) -> String {
    match message {
        OutboundMessage::Text { content } => format!("{} {}", "bot>".cyan().bold(), content),
        OutboundMessage::Agreement(agreement) => format!(
            "{} {}\n{}\n{}",
            "bot>".cyan().bold(),
            agreement.title.bold(),
            agreement.body,
            agreement.confirm.yellow()
        ),
    }
}

#[async_trait]
impl<W: Write + Send> Messenger for ConsoleMessenger<W> {
    async fn send(&self, _channel: &ChannelId, message: OutboundMessage) -> Result<(), MessagingError> {
        let mut out = self.out.lock();
        writeln!(out, "{}", render(&message))
            .and_then(|_| out.flush())
            .map_err(|e| MessagingError::Send(e.to_string()))
    }
}
