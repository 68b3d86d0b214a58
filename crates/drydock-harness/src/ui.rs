//! Terminal console client for a running control server.

#![allow(missing_docs)]

use std::io;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use drydock_console::{Chord, ChordKey, CompletionItem, ConsoleSession, Keymap, SubmitOutcome};
use ratatui::backend::CrosstermBackend;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Terminal,
};
use text_size::TextSize;

use crate::config::ConsoleConfig;
use crate::transport::ControlClient;

const COLOR_TEAL: Color = Color::Rgb(0, 168, 150);
const COLOR_GREEN: Color = Color::Rgb(46, 204, 113);
const COLOR_AMBER: Color = Color::Rgb(243, 156, 18);
const COLOR_RED: Color = Color::Rgb(231, 76, 60);
const COLOR_INFO: Color = Color::Rgb(142, 142, 147);
const COLOR_YELLOW: Color = Color::Rgb(245, 196, 66);
const COLOR_PROMPT_BG: Color = Color::Rgb(24, 24, 24);

struct Popup {
    from: usize,
    items: Vec<CompletionItem>,
    selected: usize,
}

struct UiState {
    session: ConsoleSession,
    input_cursor: usize,
    popup: Option<Popup>,
    /// Command latched by the submit chord, sent after the next draw so the
    /// waiting state is on screen while the request blocks.
    outbound: Option<String>,
    snapshot: String,
    connected: bool,
    last_error: Option<String>,
}

/// Runs the interactive console against the configured endpoint.
pub fn run_console(config: &ConsoleConfig) -> anyhow::Result<()> {
    let client = ControlClient::new(config.endpoint.as_str());
    let commands = client
        .commands()
        .context("fetching the command index")?
        .into_index();
    let initial = client.load().context("loading the initial snapshot")?;

    let mut state = UiState {
        session: ConsoleSession::new(commands),
        input_cursor: 0,
        popup: None,
        outbound: None,
        snapshot: initial.html,
        connected: true,
        last_error: None,
    };
    let keymap = config.keymap;
    let refresh = config.refresh_interval;
    let mut last_refresh = Instant::now();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = (|| {
        loop {
            if last_refresh.elapsed() >= refresh && !state.session.in_flight() {
                match client.load() {
                    Ok(response) => {
                        state.connected = true;
                        state.snapshot = response.html;
                    }
                    Err(_) => state.connected = false,
                }
                last_refresh = Instant::now();
            }

            terminal.draw(|frame| render_ui(frame.area(), frame, &state, &keymap))?;

            if let Some(command) = state.outbound.take() {
                resolve_submission(&client, &mut state, &command);
                // The reply carried a fresh snapshot; no point reloading.
                last_refresh = Instant::now();
                continue;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if handle_key(key, &mut state, &keymap) {
                        break;
                    }
                }
            }
        }
        Ok(())
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

/// Maps a terminal key event onto the chord shape used by the keymap.
fn chord_of(key: &KeyEvent) -> Option<Chord> {
    let code = match key.code {
        KeyCode::Enter => ChordKey::Enter,
        KeyCode::Up => ChordKey::Up,
        KeyCode::Down => ChordKey::Down,
        KeyCode::Tab => ChordKey::Tab,
        KeyCode::Esc => ChordKey::Escape,
        KeyCode::Char(ch) => ChordKey::Char(ch.to_ascii_lowercase()),
        _ => return None,
    };
    Some(Chord {
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        key: code,
    })
}

fn handle_key(key: KeyEvent, state: &mut UiState, keymap: &Keymap) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    // The three bound chords consume the event outright; the input pane
    // never sees them as ordinary keystrokes.
    if let Some(chord) = chord_of(&key) {
        if chord == keymap.submit {
            state.outbound = state.session.begin_submit();
            state.popup = None;
            return false;
        }
        if chord == keymap.history_prev {
            state.session.history_previous();
            state.input_cursor = state.session.buffer().len();
            state.popup = None;
            return false;
        }
        if chord == keymap.history_next {
            state.session.history_next();
            state.input_cursor = state.session.buffer().len();
            state.popup = None;
            return false;
        }
    }

    if state.popup.is_some() {
        match key.code {
            KeyCode::Up => {
                move_popup_selection(state, -1);
                return false;
            }
            KeyCode::Down => {
                move_popup_selection(state, 1);
                return false;
            }
            KeyCode::Tab | KeyCode::Enter => {
                accept_completion(state);
                return false;
            }
            KeyCode::Esc => {
                state.popup = None;
                return false;
            }
            _ => {}
        }
    } else if key.code == KeyCode::Tab {
        state.popup = build_popup(&state.session, state.input_cursor);
        return false;
    }

    match key.code {
        KeyCode::Backspace => {
            if state.input_cursor > 0 {
                let mut text = state.session.buffer().to_string();
                let start = prev_char_start(&text, state.input_cursor);
                text.replace_range(start..state.input_cursor, "");
                state.session.set_buffer(text);
                state.input_cursor = start;
                refresh_popup(state);
            }
        }
        KeyCode::Delete => {
            let mut text = state.session.buffer().to_string();
            if state.input_cursor < text.len() {
                let end = next_char_end(&text, state.input_cursor);
                text.replace_range(state.input_cursor..end, "");
                state.session.set_buffer(text);
                refresh_popup(state);
            }
        }
        KeyCode::Left => {
            state.input_cursor = prev_char_start(state.session.buffer(), state.input_cursor);
        }
        KeyCode::Right => {
            state.input_cursor = next_char_end(state.session.buffer(), state.input_cursor);
        }
        KeyCode::Home => state.input_cursor = 0,
        KeyCode::End => state.input_cursor = state.session.buffer().len(),
        KeyCode::Char(ch) => {
            let mut text = state.session.buffer().to_string();
            text.insert(state.input_cursor, ch);
            state.session.set_buffer(text);
            state.input_cursor += ch.len_utf8();
            refresh_popup(state);
        }
        _ => {}
    }
    false
}

fn resolve_submission(client: &ControlClient, state: &mut UiState, command: &str) {
    let outcome = match client.submit(command) {
        Ok(response) => {
            state.connected = true;
            SubmitOutcome::from(response)
        }
        Err(err) => {
            state.connected = false;
            SubmitOutcome::transport_failure(err.to_string())
        }
    };
    state.last_error = outcome.error.clone();
    if let Some(html) = state.session.finish_submit(outcome) {
        state.snapshot = html;
    }
    state.input_cursor = 0;
}

fn build_popup(session: &ConsoleSession, cursor: usize) -> Option<Popup> {
    let result = session.completions(TextSize::from(cursor as u32))?;
    let from = usize::from(result.from);
    let typed = session
        .buffer()
        .get(from..cursor)
        .unwrap_or("")
        .to_ascii_lowercase();
    let items = result
        .items
        .into_iter()
        .filter(|item| item.label.to_ascii_lowercase().starts_with(&typed))
        .collect();
    Some(Popup {
        from,
        items,
        selected: 0,
    })
}

fn refresh_popup(state: &mut UiState) {
    if state.popup.is_some() {
        state.popup = build_popup(&state.session, state.input_cursor);
    }
}

fn move_popup_selection(state: &mut UiState, delta: i32) {
    let Some(popup) = state.popup.as_mut() else {
        return;
    };
    if popup.items.is_empty() {
        return;
    }
    let len = popup.items.len() as i32;
    let mut next = popup.selected as i32 + delta;
    if next < 0 {
        next = len - 1;
    } else if next >= len {
        next = 0;
    }
    popup.selected = next as usize;
}

fn accept_completion(state: &mut UiState) {
    let Some(popup) = state.popup.take() else {
        return;
    };
    let Some(item) = popup.items.get(popup.selected) else {
        return;
    };
    let mut text = state.session.buffer().to_string();
    let end = state.input_cursor.min(text.len());
    let from = popup.from.min(end);
    text.replace_range(from..end, item.label.as_str());
    state.session.set_buffer(text);
    state.input_cursor = from + item.label.len();
}

fn render_ui(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState, keymap: &Keymap) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);
    render_snapshot_panel(layout[0], frame, state);
    render_transcript_panel(layout[1], frame, state);
    render_input_panel(layout[2], frame, state);
    render_status_line(layout[3], frame, state, keymap);
    if state.popup.is_some() {
        render_popup(layout[1], frame, state);
    }
}

fn render_snapshot_panel(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let block = panel_block("Application", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let lines: Vec<Line> = snapshot_lines(&state.snapshot)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(Color::White))))
        .collect();
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_transcript_panel(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let block = panel_block("Transcript", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for entry in state.session.history().entries() {
        lines.push(Line::from(vec![
            Span::styled("> ", Style::default().fg(COLOR_TEAL)),
            Span::styled(entry.command.clone(), Style::default().fg(Color::White)),
        ]));
        if let Some(error) = &entry.error {
            lines.push(Line::from(Span::styled(
                format!("  ! {error}"),
                Style::default().fg(COLOR_RED),
            )));
        }
    }
    let scroll = lines.len().saturating_sub(inner.height as usize) as u16;
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn render_input_panel(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let block = if state.session.in_flight() {
        panel_block("Input (waiting)", false).border_style(Style::default().fg(COLOR_AMBER))
    } else {
        panel_block("Input", true)
    };
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let prompt = Line::from(vec![
        Span::styled(
            "> ",
            Style::default().fg(COLOR_TEAL).add_modifier(Modifier::BOLD),
        ),
        Span::raw(state.session.buffer().to_string()),
    ]);
    frame.render_widget(
        Paragraph::new(prompt).style(Style::default().bg(COLOR_PROMPT_BG)),
        inner,
    );
    let column = state.session.buffer()[..state.input_cursor].chars().count() as u16;
    frame.set_cursor_position((inner.x + 2 + column, inner.y));
}

fn render_status_line(
    area: Rect,
    frame: &mut ratatui::Frame<'_>,
    state: &UiState,
    keymap: &Keymap,
) {
    let mut spans = Vec::new();
    if state.connected {
        spans.push(Span::styled(" LIVE ", Style::default().fg(COLOR_GREEN)));
    } else {
        spans.push(Span::styled(" OFFLINE ", Style::default().fg(COLOR_AMBER)));
    }
    if state.session.in_flight() {
        spans.push(Span::styled("sending… ", Style::default().fg(COLOR_AMBER)));
    }
    if let Some(error) = &state.last_error {
        spans.push(Span::styled(
            format!("{error} "),
            Style::default().fg(COLOR_RED),
        ));
    }
    spans.push(Span::styled(
        format!(
            "{} submit · {}/{} history · tab complete · ctrl-c quit",
            keymap.submit, keymap.history_prev, keymap.history_next
        ),
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::DIM),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_popup(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let Some(popup) = state.popup.as_ref() else {
        return;
    };
    let mut lines: Vec<Line> = Vec::new();
    if popup.items.is_empty() {
        lines.push(Line::from(Span::styled(
            "(no suggestions)",
            Style::default().fg(COLOR_INFO),
        )));
    }
    for (idx, item) in popup.items.iter().enumerate() {
        let style = if idx == popup.selected {
            Style::default()
                .fg(Color::Black)
                .bg(COLOR_TEAL)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let mut spans = vec![Span::styled(format!(" {} ", item.label), style)];
        if let Some(detail) = &item.detail {
            spans.push(Span::styled(
                format!("{detail} "),
                Style::default().fg(COLOR_INFO),
            ));
        }
        lines.push(Line::from(spans));
    }

    let height = (lines.len() as u16 + 2).min(area.height);
    let width = area.width.saturating_sub(4).clamp(20, 40);
    let rect = Rect {
        x: area.x + 2,
        y: area.y + area.height.saturating_sub(height),
        width,
        height,
    };
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .title(Span::styled(
            " Suggestions ",
            Style::default().fg(COLOR_YELLOW),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(Style::default().fg(COLOR_TEAL));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn panel_block(title: &str, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(COLOR_TEAL)
    } else {
        Style::default().fg(COLOR_INFO)
    };
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(COLOR_YELLOW)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(border_style)
}

/// Flattens the snapshot HTML into display lines: one line per element,
/// tags dropped, basic entities unescaped.
fn snapshot_lines(html: &str) -> Vec<String> {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push('\n');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.lines()
        .map(|line| unescape_html(line.trim()))
        .filter(|line| !line.is_empty())
        .collect()
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn prev_char_start(text: &str, cursor: usize) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map_or(0, |(idx, _)| idx)
}

fn next_char_end(text: &str, cursor: usize) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map_or(cursor, |ch| cursor + ch.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_lines_flatten_the_document() {
        let html = "<div class=\"panel\"><h1>Panel</h1><p>Lamp: <b>ON</b></p><li>log &lt;x&gt;</li></div>";
        let lines = snapshot_lines(html);
        assert_eq!(lines, vec!["Panel", "Lamp:", "ON", "log <x>"]);
    }

    #[test]
    fn chords_map_from_terminal_events() {
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL);
        assert_eq!(chord_of(&key), Some(Keymap::default().submit));

        let key = KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT);
        let chord = chord_of(&key).unwrap();
        assert!(chord.shift);
        assert_eq!(chord.key, ChordKey::Char('s'));

        let key = KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE);
        assert_eq!(chord_of(&key), None);
    }

    #[test]
    fn cursor_steps_respect_char_boundaries() {
        let text = "añb";
        assert_eq!(next_char_end(text, 0), 1);
        assert_eq!(next_char_end(text, 1), 3);
        assert_eq!(prev_char_start(text, 3), 1);
        assert_eq!(prev_char_start(text, 1), 0);
        assert_eq!(prev_char_start(text, 0), 0);
    }
}
