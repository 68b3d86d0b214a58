//! Command history and chord-driven navigation.
//!
//! Every submission appends one [`CommandEntry`] to the session's
//! [`CommandHistory`], whether the command succeeded or not. The entries are
//! never mutated or removed, so the history doubles as an audit trail of
//! everything the user tried. A [`HistoryCursor`] walks the record backwards
//! and forwards in response to the history chords, telling the input pane
//! what its buffer should become.

/// One submitted command with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    /// The command text exactly as submitted.
    pub command: String,
    /// Execution or transport error reported for this submission, if any.
    pub error: Option<String>,
}

impl CommandEntry {
    /// Creates an entry for a submission that resolved without an error.
    #[must_use]
    pub fn ok(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            error: None,
        }
    }

    /// Creates an entry for a submission that failed.
    #[must_use]
    pub fn failed(command: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            error: Some(error.into()),
        }
    }
}

/// Append-only record of submitted commands, oldest first.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: Vec<CommandEntry>,
}

impl CommandHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Entries are never removed within a session.
    pub fn push(&mut self, entry: CommandEntry) {
        self.entries.push(entry);
    }

    /// Number of recorded submissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been submitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in submission order.
    #[must_use]
    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// The command at recall position `position`, counting back from the
    /// newest entry. Position `1` is the most recent submission; `0` and
    /// positions past the oldest entry return `None`.
    #[must_use]
    pub fn recall(&self, position: usize) -> Option<&str> {
        if position == 0 || position > self.entries.len() {
            return None;
        }
        Some(self.entries[self.entries.len() - position].command.as_str())
    }

    /// Newline-joined command texts, the transcript pane's content.
    #[must_use]
    pub fn transcript(&self) -> String {
        let commands: Vec<&str> = self
            .entries
            .iter()
            .map(|entry| entry.command.as_str())
            .collect();
        commands.join("\n")
    }
}

/// What the input buffer should become after a navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recall {
    /// Clamped at a boundary; leave the buffer alone.
    Keep,
    /// Replace the whole buffer with a recalled command.
    Load(String),
    /// Back at fresh input; clear the buffer.
    Clear,
}

/// Cursor into a [`CommandHistory`] for chord-driven recall.
///
/// The cursor holds a recall position in `[0, len]`. Position `0` means the
/// user is on fresh input; stepping back moves towards the oldest entry and
/// clamps there, stepping forward moves towards position `0` and clears the
/// buffer on arrival. Submitting resets the cursor to `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryCursor {
    index: usize,
}

impl HistoryCursor {
    /// Creates a cursor at fresh input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current recall position. `0` means fresh input.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the cursor to fresh input. Called after every submission.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Moves one step towards the oldest entry.
    ///
    /// Clamps at the oldest entry; on an empty history this is a no-op.
    pub fn step_back(&mut self, history: &CommandHistory) -> Recall {
        let new = usize::min(self.index + 1, history.len());
        if new == self.index {
            return Recall::Keep;
        }
        self.index = new;
        match history.recall(new) {
            Some(command) => Recall::Load(command.to_owned()),
            None => Recall::Keep,
        }
    }

    /// Moves one step towards fresh input.
    ///
    /// Reaching position `0` clears the buffer, matching the chord's role of
    /// walking back to a blank prompt. On an empty history this is a no-op.
    pub fn step_forward(&mut self, history: &CommandHistory) -> Recall {
        if history.is_empty() {
            return Recall::Keep;
        }
        let new = self.index.saturating_sub(1);
        self.index = new;
        if new == 0 {
            return Recall::Clear;
        }
        match history.recall(new) {
            Some(command) => Recall::Load(command.to_owned()),
            None => Recall::Keep,
        }
    }
}
