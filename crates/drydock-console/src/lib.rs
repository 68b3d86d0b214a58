//! `drydock-console` - console core for the drydock test harness.
//!
//! This crate holds everything the command console does that is worth
//! testing in isolation from terminals and sockets:
//!
//! - **Lexer**: Tokenizes console command lines
//! - **History**: Append-only command record with chord-driven navigation
//! - **Completion**: Object and member suggestions from the application's
//!   command index
//! - **Session**: The submission protocol and its in-flight bookkeeping
//! - **Protocol**: Wire types for the control server's routes
//! - **Keymap**: Chord parsing for the configurable key bindings
//!
//! # Architecture
//!
//! Everything here is a pure function or a plain state machine; the harness
//! crate wires these pieces to the terminal UI, the HTTP transport, and the
//! control server.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod completion;
pub mod history;
pub mod keymap;
pub mod lexer;
pub mod protocol;
pub mod session;

pub use completion::{complete, CommandIndex, CompletionItem, CompletionKind, CompletionResult};
pub use history::{CommandEntry, CommandHistory, HistoryCursor, Recall};
pub use keymap::{Chord, ChordKey, InvalidChord, Keymap};
pub use lexer::{lex, lex_with_text, Lexer, Token, TokenKind};
pub use protocol::{CommandRequest, CommandResponse, CommandsResponse, LoadResponse};
pub use session::{ConsoleSession, SubmitOutcome};
