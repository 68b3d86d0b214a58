//! Lexer for console command lines.
//!
//! A command line addresses an object exposed by the application under test
//! and invokes one of its members, e.g. `lamp.turn_on()` or
//! `log.append("booting", 3)`. The lexer tokenizes a single line into a
//! stream of tokens with their byte positions; completion and the fixture
//! interpreter both work on this stream.

use logos::Logos;
use text_size::{TextRange, TextSize};

/// All token kinds in the console command language.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenKind {
    /// Whitespace (spaces, tabs)
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// `.`
    #[token(".")]
    Dot,

    /// `,`
    #[token(",")]
    Comma,

    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// String literal: `'...'` or `"..."` with backslash escapes
    #[regex(r#"'([^'\\]|\\.)*'"#)]
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,

    /// Integer literal: `42`
    #[regex(r"[0-9]+")]
    IntLiteral,

    /// Real literal: `1.5`
    #[regex(r"[0-9]+\.[0-9]+")]
    RealLiteral,

    /// Identifier: object and member names
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    /// Unrecognized input
    #[default]
    Error,
}

impl TokenKind {
    /// Returns true for tokens with no semantic significance.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        self == TokenKind::Whitespace
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The byte range of the token in the command line.
    pub range: TextRange,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, range: TextRange) -> Self {
        Self { kind, range }
    }

    /// Returns the token's text within `source`.
    #[must_use]
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[usize::from(self.range.start())..usize::from(self.range.end())]
    }
}

/// Lexer for console command lines.
///
/// The lexer is an iterator over tokens. It handles all error recovery
/// internally - any unrecognized characters are returned as `TokenKind::Error`.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given command line.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
        }
    }

    /// Returns the command line being lexed.
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = self.inner.next()?;
        let span = self.inner.span();

        let kind = kind.unwrap_or(TokenKind::Error);
        let range = TextRange::new(
            TextSize::from(span.start as u32),
            TextSize::from(span.end as u32),
        );

        Some(Token::new(kind, range))
    }
}

/// Lex an entire command line and return all tokens.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// Lex a command line and return tokens paired with their text.
///
/// Useful for debugging and testing.
#[must_use]
pub fn lex_with_text(source: &str) -> Vec<(Token, &str)> {
    Lexer::new(source)
        .map(|token| (token, token.text(source)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn lex_member_call() {
        let source = "lamp.turn_on()";
        let tokens = lex(source);

        let non_trivia: Vec<_> = tokens.iter().filter(|t| !t.kind.is_trivia()).collect();
        assert_eq!(non_trivia.len(), 5);
        assert_eq!(non_trivia[0].kind, TokenKind::Ident);
        assert_eq!(non_trivia[1].kind, TokenKind::Dot);
        assert_eq!(non_trivia[2].kind, TokenKind::Ident);
        assert_eq!(non_trivia[3].kind, TokenKind::LParen);
        assert_eq!(non_trivia[4].kind, TokenKind::RParen);
    }

    #[test]
    fn lex_preserves_positions() {
        let source = "counter.add 12";
        let tokens = lex(source);

        assert_eq!(tokens[0].range, TextRange::new(0.into(), 7.into()));
        assert_eq!(tokens[1].range, TextRange::new(7.into(), 8.into()));
        assert_eq!(tokens[2].range, TextRange::new(8.into(), 11.into()));
    }

    #[test]
    fn lex_arguments() {
        let source = r#"log.append("line one", 2, 1.5)"#;
        let tokens = lex_with_text(source);

        let non_trivia: Vec<_> = tokens.iter().filter(|(t, _)| !t.kind.is_trivia()).collect();
        assert_eq!(non_trivia[2].1, "append");
        assert_eq!(non_trivia[4].0.kind, TokenKind::StringLiteral);
        assert_eq!(non_trivia[6].0.kind, TokenKind::IntLiteral);
        assert_eq!(non_trivia[8].0.kind, TokenKind::RealLiteral);
    }

    #[test]
    fn lex_single_quoted_string() {
        let source = r"msg.set('it\'s fine')";
        let tokens = lex(source);
        assert!(tokens.iter().any(|t| t.kind == TokenKind::StringLiteral));
        assert!(!tokens.iter().any(|t| t.kind == TokenKind::Error));
    }

    #[test]
    fn unrecognized_input_becomes_error_tokens() {
        let source = "lamp.§§";
        let tokens = lex(source);
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Error));
    }

    #[test]
    fn golden_token_stream() {
        let source = "counter.add(2)";
        let rendered: String = lex_with_text(source)
            .into_iter()
            .map(|(token, text)| format!("{:?} {:?}\n", token.kind, text))
            .collect();

        expect![[r#"
            Ident "counter"
            Dot "."
            Ident "add"
            LParen "("
            IntLiteral "2"
            RParen ")"
        "#]]
        .assert_eq(&rendered);
    }
}
