//! The console session: input buffer, history, and the submission protocol.
//!
//! [`ConsoleSession`] is the single owner of everything the console client
//! mutates: the pending input buffer, the command history, the navigation
//! cursor, and the in-flight submission latch. The editor widget stays
//! behind a narrow get-text/set-text surface, and the transport is injected
//! by the caller: `begin_submit` hands out the command to send, the caller
//! resolves it however it likes, and `finish_submit` folds the outcome back
//! into the session.

use text_size::TextSize;
use tracing::debug;

use crate::completion::{complete, CommandIndex, CompletionResult};
use crate::history::{CommandEntry, CommandHistory, HistoryCursor, Recall};
use crate::protocol::CommandResponse;

/// Outcome of one resolved submission, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Rendered snapshot returned by the server, when the request got
    /// through at all.
    pub html: Option<String>,
    /// Execution or transport error, if any.
    pub error: Option<String>,
}

impl SubmitOutcome {
    /// Outcome of a request the server answered, successfully or not.
    #[must_use]
    pub fn resolved(html: impl Into<String>, error: Option<String>) -> Self {
        Self {
            html: Some(html.into()),
            error,
        }
    }

    /// Outcome of a request that never produced a server response.
    #[must_use]
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            html: None,
            error: Some(message.into()),
        }
    }
}

impl From<CommandResponse> for SubmitOutcome {
    fn from(response: CommandResponse) -> Self {
        Self {
            html: Some(response.html),
            error: response.error,
        }
    }
}

/// Client-side session state for the command console.
#[derive(Debug, Default)]
pub struct ConsoleSession {
    buffer: String,
    history: CommandHistory,
    cursor: HistoryCursor,
    commands: CommandIndex,
    pending: Option<String>,
}

impl ConsoleSession {
    /// Creates a fresh session over the command index published by the
    /// application under test.
    #[must_use]
    pub fn new(commands: CommandIndex) -> Self {
        Self {
            commands,
            ..Self::default()
        }
    }

    /// The pending input buffer.
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Replaces the input buffer. Keystroke edits from the input pane and
    /// history recalls both land here.
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// The session's command history.
    #[must_use]
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Newline-joined command texts for the transcript pane.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.history.transcript()
    }

    /// The command index driving completion.
    #[must_use]
    pub fn commands(&self) -> &CommandIndex {
        &self.commands
    }

    /// Current recall position of the navigation cursor.
    #[must_use]
    pub fn nav_index(&self) -> usize {
        self.cursor.index()
    }

    /// Returns true while a submission awaits its outcome.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Recalls the previous (older) command into the buffer.
    pub fn history_previous(&mut self) {
        let recall = self.cursor.step_back(&self.history);
        self.apply_recall(recall);
    }

    /// Recalls the next (newer) command, clearing the buffer when the
    /// cursor walks back onto fresh input.
    pub fn history_next(&mut self) {
        let recall = self.cursor.step_forward(&self.history);
        self.apply_recall(recall);
    }

    fn apply_recall(&mut self, recall: Recall) {
        match recall {
            Recall::Keep => {}
            Recall::Load(command) => self.buffer = command,
            Recall::Clear => self.buffer.clear(),
        }
    }

    /// Completion candidates at `cursor` in the buffer.
    #[must_use]
    pub fn completions(&self, cursor: TextSize) -> Option<CompletionResult> {
        complete(&self.buffer, cursor, &self.commands)
    }

    /// Starts a submission, yielding the command to send.
    ///
    /// Returns `None` while a prior submission is unresolved; history
    /// append order stays sequential because at most one request is ever
    /// outstanding.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.pending.is_some() {
            return None;
        }
        let command = self.buffer.clone();
        debug!(command = %command, "submitting command");
        self.pending = Some(command.clone());
        Some(command)
    }

    /// Resolves the outstanding submission.
    ///
    /// Appends one history entry whatever the outcome, clears the buffer,
    /// resets the navigation cursor, and releases the in-flight latch.
    /// Returns the rendered snapshot for the caller's state view. Without
    /// an outstanding submission this is a no-op.
    pub fn finish_submit(&mut self, outcome: SubmitOutcome) -> Option<String> {
        let command = self.pending.take()?;
        if let Some(error) = &outcome.error {
            debug!(command = %command, error = %error, "submission failed");
        }
        self.history.push(CommandEntry {
            command,
            error: outcome.error,
        });
        self.buffer.clear();
        self.cursor.reset();
        outcome.html
    }
}
