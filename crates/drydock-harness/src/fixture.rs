//! Built-in status panel fixture application.
//!
//! `PanelApp` is the application under test the harness ships for demos and
//! its own integration tests: a small status panel with a lamp, a counter,
//! and a message log. Commands follow the console grammar
//! (`object.member(args)`), and the rendered snapshot refers to assets by
//! logical path so manifest rewriting is exercised end to end.

use drydock_console::lexer::{lex, Token, TokenKind};
use drydock_console::CommandIndex;
use smol_str::SmolStr;

use crate::app::Application;
use crate::error::HarnessError;

/// A command argument after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Int(i64),
    Text(String),
}

/// A parsed `object.member(args)` invocation.
#[derive(Debug)]
struct Invocation<'a> {
    object: &'a str,
    member: &'a str,
    args: Vec<Arg>,
}

fn malformed(reason: &str) -> HarnessError {
    HarnessError::MalformedCommand(SmolStr::new(reason))
}

/// Parses a command line into an invocation.
///
/// The member call parentheses are optional when no arguments are passed,
/// so `lamp.toggle` and `lamp.toggle()` are the same command.
fn parse_invocation(command: &str) -> Result<Invocation<'_>, HarnessError> {
    let tokens: Vec<Token> = lex(command)
        .into_iter()
        .filter(|token| !token.kind.is_trivia())
        .collect();

    if tokens.is_empty() {
        return Err(malformed("empty command"));
    }
    let [object, dot, member, rest @ ..] = tokens.as_slice() else {
        return Err(malformed("expected object.member(...)"));
    };
    if object.kind != TokenKind::Ident
        || dot.kind != TokenKind::Dot
        || member.kind != TokenKind::Ident
    {
        return Err(malformed("expected object.member(...)"));
    }

    let args = parse_args(command, rest)?;
    Ok(Invocation {
        object: object.text(command),
        member: member.text(command),
        args,
    })
}

fn parse_args(command: &str, tokens: &[Token]) -> Result<Vec<Arg>, HarnessError> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }
    let [open, inner @ .., close] = tokens else {
        return Err(malformed("unbalanced argument list"));
    };
    if open.kind != TokenKind::LParen || close.kind != TokenKind::RParen {
        return Err(malformed("unbalanced argument list"));
    }

    let mut args = Vec::new();
    let mut expect_value = true;
    for token in inner {
        if expect_value {
            let arg = match token.kind {
                TokenKind::IntLiteral => {
                    let text = token.text(command);
                    let value = text
                        .parse()
                        .map_err(|_| malformed("integer out of range"))?;
                    Arg::Int(value)
                }
                TokenKind::StringLiteral => Arg::Text(unquote(token.text(command))),
                _ => return Err(malformed("unsupported argument")),
            };
            args.push(arg);
            expect_value = false;
        } else {
            if token.kind != TokenKind::Comma {
                return Err(malformed("expected ',' between arguments"));
            }
            expect_value = true;
        }
    }
    if expect_value && !args.is_empty() {
        return Err(malformed("trailing ',' in argument list"));
    }
    Ok(args)
}

/// Strips the surrounding quotes and resolves backslash escapes.
fn unquote(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// The status panel fixture.
#[derive(Debug, Clone, Default)]
pub struct PanelApp {
    lamp_on: bool,
    counter: i64,
    messages: Vec<String>,
}

impl PanelApp {
    /// Creates the panel in its initial state: lamp off, counter at zero,
    /// empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lamp_command(&mut self, call: &Invocation<'_>) -> Result<(), HarnessError> {
        match call.member {
            "turn_on" => {
                no_args(call)?;
                self.lamp_on = true;
            }
            "turn_off" => {
                no_args(call)?;
                self.lamp_on = false;
            }
            "toggle" => {
                no_args(call)?;
                self.lamp_on = !self.lamp_on;
            }
            _ => return Err(unknown_member(call)),
        }
        Ok(())
    }

    fn counter_command(&mut self, call: &Invocation<'_>) -> Result<(), HarnessError> {
        match call.member {
            "add" => {
                let step = match call.args.as_slice() {
                    [] => 1,
                    [Arg::Int(step)] => *step,
                    _ => {
                        return Err(invalid_argument(call, "expected at most one integer"));
                    }
                };
                self.counter = self.counter.saturating_add(step);
            }
            "reset" => {
                no_args(call)?;
                self.counter = 0;
            }
            _ => return Err(unknown_member(call)),
        }
        Ok(())
    }

    fn log_command(&mut self, call: &Invocation<'_>) -> Result<(), HarnessError> {
        match call.member {
            "append" => {
                let [Arg::Text(message)] = call.args.as_slice() else {
                    return Err(invalid_argument(call, "expected a single string"));
                };
                self.messages.push(message.clone());
            }
            "clear" => {
                no_args(call)?;
                self.messages.clear();
            }
            _ => return Err(unknown_member(call)),
        }
        Ok(())
    }
}

fn no_args(call: &Invocation<'_>) -> Result<(), HarnessError> {
    if call.args.is_empty() {
        Ok(())
    } else {
        Err(invalid_argument(call, "expected no arguments"))
    }
}

fn unknown_member(call: &Invocation<'_>) -> HarnessError {
    HarnessError::UnknownMember {
        object: SmolStr::new(call.object),
        member: SmolStr::new(call.member),
    }
}

fn invalid_argument(call: &Invocation<'_>, reason: &str) -> HarnessError {
    HarnessError::InvalidArgument {
        member: SmolStr::new(call.member),
        reason: SmolStr::new(reason),
    }
}

impl Application for PanelApp {
    fn execute(&mut self, command: &str) -> Result<(), HarnessError> {
        let call = parse_invocation(command)?;
        match call.object {
            "lamp" => self.lamp_command(&call),
            "counter" => self.counter_command(&call),
            "log" => self.log_command(&call),
            other => Err(HarnessError::UnknownObject(SmolStr::new(other))),
        }
    }

    fn render(&self) -> String {
        let state = if self.lamp_on { "on" } else { "off" };
        let text = if self.lamp_on { "ON" } else { "OFF" };

        let mut html = String::new();
        html.push_str("<link rel=\"stylesheet\" href=\"main.css\"/>\n");
        html.push_str("<div class=\"panel\">\n");
        html.push_str(
            "  <header><img src=\"logo.png\" alt=\"logo\"/><h1>Status Panel</h1></header>\n",
        );
        html.push_str(&format!(
            "  <section class=\"lamp {state}\">Lamp: {text}</section>\n"
        ));
        html.push_str(&format!(
            "  <section class=\"counter\">Counter: {}</section>\n",
            self.counter
        ));
        html.push_str("  <ul class=\"log\">\n");
        for message in &self.messages {
            html.push_str(&format!("    <li>{}</li>\n", escape_html(message)));
        }
        html.push_str("  </ul>\n");
        html.push_str("</div>\n");
        html
    }

    fn commands(&self) -> CommandIndex {
        let mut index = CommandIndex::new();
        index.insert("lamp", ["turn_on", "turn_off", "toggle"]);
        index.insert("counter", ["add", "reset"]);
        index.insert("log", ["append", "clear"]);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lamp_commands_flip_the_lamp() {
        let mut app = PanelApp::new();

        app.execute("lamp.turn_on()").unwrap();
        assert!(app.lamp_on);
        app.execute("lamp.toggle()").unwrap();
        assert!(!app.lamp_on);
        app.execute("lamp.toggle").unwrap();
        assert!(app.lamp_on);
        app.execute("lamp.turn_off()").unwrap();
        assert!(!app.lamp_on);
    }

    #[test]
    fn counter_adds_and_resets() {
        let mut app = PanelApp::new();

        app.execute("counter.add()").unwrap();
        app.execute("counter.add(4)").unwrap();
        assert_eq!(app.counter, 5);
        app.execute("counter.reset()").unwrap();
        assert_eq!(app.counter, 0);
    }

    #[test]
    fn log_appends_and_clears() {
        let mut app = PanelApp::new();

        app.execute(r#"log.append("first line")"#).unwrap();
        app.execute(r"log.append('it\'s fine')").unwrap();
        assert_eq!(app.messages, vec!["first line", "it's fine"]);
        app.execute("log.clear()").unwrap();
        assert!(app.messages.is_empty());
    }

    #[test]
    fn unknown_object_and_member_are_reported() {
        let mut app = PanelApp::new();

        let err = app.execute("valve.open()").unwrap_err();
        assert_eq!(err, HarnessError::UnknownObject("valve".into()));

        let err = app.execute("lamp.explode()").unwrap_err();
        assert_eq!(err.to_string(), "unknown member 'lamp.explode'");
    }

    #[test]
    fn malformed_commands_are_rejected() {
        let mut app = PanelApp::new();

        assert!(app.execute("").is_err());
        assert!(app.execute("   ").is_err());
        assert!(app.execute("lamp").is_err());
        assert!(app.execute("lamp.toggle(").is_err());
        assert!(app.execute("lamp.toggle()extra").is_err());
        assert!(app.execute("counter.add(1 2)").is_err());
        assert!(app.execute("counter.add(1,)").is_err());
    }

    #[test]
    fn argument_type_errors_name_the_member() {
        let mut app = PanelApp::new();

        let err = app.execute(r#"counter.add("two")"#).unwrap_err();
        assert!(err.to_string().contains("add"));

        let err = app.execute("log.append(3)").unwrap_err();
        assert!(err.to_string().contains("append"));
    }

    #[test]
    fn failed_commands_leave_state_renderable() {
        let mut app = PanelApp::new();
        app.execute("counter.add(2)").unwrap();

        let before = app.render();
        assert!(app.execute("counter.explode()").is_err());
        assert_eq!(app.render(), before);
    }

    #[test]
    fn command_index_lists_objects_in_declaration_order() {
        let app = PanelApp::new();
        let index = app.commands();

        let objects: Vec<&str> = index.objects().map(|object| object.as_str()).collect();
        assert_eq!(objects, vec!["lamp", "counter", "log"]);
        assert_eq!(
            index.members("lamp").map(|members| members.len()),
            Some(3)
        );
    }

    #[test]
    fn renders_the_panel_snapshot() {
        let mut app = PanelApp::new();
        app.execute("lamp.turn_on()").unwrap();
        app.execute("counter.add(2)").unwrap();
        app.execute(r#"log.append("booting")"#).unwrap();
        app.execute(r#"log.append("lamp <ready>")"#).unwrap();

        insta::assert_snapshot!(app.render(), @r#"
        <link rel="stylesheet" href="main.css"/>
        <div class="panel">
          <header><img src="logo.png" alt="logo"/><h1>Status Panel</h1></header>
          <section class="lamp on">Lamp: ON</section>
          <section class="counter">Counter: 2</section>
          <ul class="log">
            <li>booting</li>
            <li>lamp &lt;ready&gt;</li>
          </ul>
        </div>
        "#);
    }
}
