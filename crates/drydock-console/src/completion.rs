//! Context-aware completion for console command lines.
//!
//! Suggestions come from the command index the application under test
//! publishes: member completion after `object.`, object completion on a bare
//! identifier. The provider is a pure function of the line, the cursor, and
//! the index; it never mutates session state.

use indexmap::IndexMap;
use smol_str::SmolStr;
use text_size::TextSize;

use crate::lexer::{lex, Token, TokenKind};

/// Ordered mapping from object name to invokable member names, published by
/// the application under test.
///
/// Iteration order is the order the application declared its objects and
/// members in; suggestion lists preserve it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandIndex {
    objects: IndexMap<SmolStr, Vec<SmolStr>>,
}

impl CommandIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an object and its invokable members.
    pub fn insert(
        &mut self,
        object: impl Into<SmolStr>,
        members: impl IntoIterator<Item = impl Into<SmolStr>>,
    ) {
        self.objects
            .insert(object.into(), members.into_iter().map(Into::into).collect());
    }

    /// The members of `object`, in declaration order.
    #[must_use]
    pub fn members(&self, object: &str) -> Option<&[SmolStr]> {
        self.objects.get(object).map(Vec::as_slice)
    }

    /// All object names, in declaration order.
    pub fn objects(&self) -> impl Iterator<Item = &SmolStr> {
        self.objects.keys()
    }

    /// All `(object, members)` pairs, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &[SmolStr])> {
        self.objects
            .iter()
            .map(|(object, members)| (object, members.as_slice()))
    }

    /// Number of registered objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if no objects are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// The kind of completion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// An object exposed by the application under test.
    Object,
    /// A member invokable on an object.
    Member,
}

/// A completion item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    /// The label shown in the suggestion list.
    pub label: SmolStr,
    /// The kind of completion.
    pub kind: CompletionKind,
    /// Additional detail (for members, the owning object).
    pub detail: Option<SmolStr>,
}

impl CompletionItem {
    /// Creates a new completion item.
    pub fn new(label: impl Into<SmolStr>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
        }
    }

    /// Sets the detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<SmolStr>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Completion candidates for the input pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    /// Byte offset the candidates replace from, up to the cursor.
    pub from: TextSize,
    /// Candidates in the order the application declared them.
    pub items: Vec<CompletionItem>,
}

/// Computes completions at `cursor` in `line`.
///
/// Member completion triggers after `object.` or inside the partial member
/// name following the dot; an unknown object yields an empty candidate list
/// rather than `None`. Object completion triggers on a bare identifier. Any
/// other context returns `None`, deferring to default editing behavior.
#[must_use]
pub fn complete(line: &str, cursor: TextSize, commands: &CommandIndex) -> Option<CompletionResult> {
    let tokens: Vec<Token> = lex(line)
        .into_iter()
        .filter(|token| !token.kind.is_trivia())
        .collect();

    // The token the cursor touches: cursor strictly inside it or at its end.
    let touched = tokens
        .iter()
        .position(|token| token.range.start() < cursor && cursor <= token.range.end());

    let Some(idx) = touched else {
        // Only trivia (or nothing) before the cursor. Member completion
        // still applies after `object.` followed by whitespace.
        let previous = tokens.iter().rposition(|token| token.range.end() <= cursor);
        if let Some(prev) = previous {
            if tokens[prev].kind == TokenKind::Dot {
                if let Some(object) = object_before_dot(&tokens, prev, line) {
                    return Some(member_completions(object, cursor, commands));
                }
            }
        }
        return None;
    };

    match tokens[idx].kind {
        TokenKind::Dot => {
            let object = object_before_dot(&tokens, idx, line)?;
            Some(member_completions(object, cursor, commands))
        }
        TokenKind::Ident => {
            if idx > 0 && tokens[idx - 1].kind == TokenKind::Dot {
                let object = object_before_dot(&tokens, idx - 1, line)?;
                Some(member_completions(
                    object,
                    tokens[idx].range.start(),
                    commands,
                ))
            } else {
                Some(object_completions(tokens[idx].range.start(), commands))
            }
        }
        _ => None,
    }
}

/// The identifier the dot at `dot_idx` accesses, if there is one.
fn object_before_dot<'src>(tokens: &[Token], dot_idx: usize, line: &'src str) -> Option<&'src str> {
    if dot_idx == 0 {
        return None;
    }
    let token = &tokens[dot_idx - 1];
    (token.kind == TokenKind::Ident).then(|| token.text(line))
}

fn member_completions(object: &str, from: TextSize, commands: &CommandIndex) -> CompletionResult {
    let items = commands
        .members(object)
        .unwrap_or(&[])
        .iter()
        .map(|member| CompletionItem::new(member.clone(), CompletionKind::Member).with_detail(object))
        .collect();
    CompletionResult { from, items }
}

fn object_completions(from: TextSize, commands: &CommandIndex) -> CompletionResult {
    let items = commands
        .objects()
        .map(|object| CompletionItem::new(object.clone(), CompletionKind::Object))
        .collect();
    CompletionResult { from, items }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_commands() -> CommandIndex {
        let mut index = CommandIndex::new();
        index.insert("app", ["start", "stop"]);
        index.insert("lamp", ["turn_on", "turn_off", "toggle"]);
        index
    }

    fn check(line_with_cursor: &str, commands: &CommandIndex) -> Option<CompletionResult> {
        let cursor = line_with_cursor.find('|').expect("cursor");
        let mut cleaned = line_with_cursor.to_string();
        cleaned.remove(cursor);
        complete(&cleaned, TextSize::from(cursor as u32), commands)
    }

    fn labels(result: &CompletionResult) -> Vec<&str> {
        result.items.iter().map(|item| item.label.as_str()).collect()
    }

    #[test]
    fn member_completion_after_dot() {
        let commands = sample_commands();
        let result = check("app.|", &commands).expect("suggestions");

        assert_eq!(labels(&result), vec!["start", "stop"]);
        assert_eq!(result.from, TextSize::from(4));
        assert_eq!(result.items[0].kind, CompletionKind::Member);
        assert_eq!(result.items[0].detail.as_deref(), Some("app"));
    }

    #[test]
    fn member_completion_inside_partial_member() {
        let commands = sample_commands();
        let result = check("lamp.tu|", &commands).expect("suggestions");

        assert_eq!(labels(&result), vec!["turn_on", "turn_off", "toggle"]);
        // Candidates replace from the start of the partial member name.
        assert_eq!(result.from, TextSize::from(5));
    }

    #[test]
    fn member_completion_survives_a_gap_after_the_dot() {
        let commands = sample_commands();
        let result = check("app. |", &commands).expect("suggestions");

        assert_eq!(labels(&result), vec!["start", "stop"]);
        assert_eq!(result.from, TextSize::from(5));
    }

    #[test]
    fn unknown_object_yields_empty_suggestions() {
        let commands = sample_commands();
        let result = check("unknown.|", &commands).expect("suggestions");

        assert!(result.items.is_empty());
    }

    #[test]
    fn bare_identifier_lists_objects() {
        let commands = sample_commands();
        let result = check("la|", &commands).expect("suggestions");

        assert_eq!(labels(&result), vec!["app", "lamp"]);
        assert_eq!(result.from, TextSize::from(0));
        assert_eq!(result.items[0].kind, CompletionKind::Object);
    }

    #[test]
    fn identifier_before_a_dot_still_completes_objects() {
        let commands = sample_commands();
        let result = check("app|.start", &commands).expect("suggestions");

        assert_eq!(labels(&result), vec!["app", "lamp"]);
    }

    #[test]
    fn dot_on_a_non_identifier_defers() {
        let commands = sample_commands();
        assert!(check("42.|", &commands).is_none());
    }

    #[test]
    fn no_suggestions_in_other_contexts() {
        let commands = sample_commands();
        assert!(check("app.start(|", &commands).is_none());
        assert!(check("|", &commands).is_none());
        assert!(check("12|", &commands).is_none());
        assert!(check(r#""text|""#, &commands).is_none());
    }

    #[test]
    fn member_order_follows_the_declaration() {
        let mut index = CommandIndex::new();
        index.insert("log", ["clear", "append", "banner"]);

        let result = check("log.|", &index).expect("suggestions");
        assert_eq!(labels(&result), vec!["clear", "append", "banner"]);
    }
}
