#![no_main]

use drydock_console::{complete, lex, CommandIndex, ConsoleSession, SubmitOutcome};
use libfuzzer_sys::fuzz_target;
use text_size::TextSize;

const MAX_LINE_BYTES: usize = 1024;

fn decode_line(bytes: &[u8]) -> String {
    let capped = &bytes[..bytes.len().min(MAX_LINE_BYTES)];
    String::from_utf8_lossy(capped).into_owned()
}

fn sample_commands() -> CommandIndex {
    let mut index = CommandIndex::new();
    index.insert("lamp", ["turn_on", "turn_off", "toggle"]);
    index.insert("counter", ["add", "reset"]);
    index.insert("log", ["append", "clear"]);
    index
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let line = decode_line(&data[1..]);
    let tokens = lex(&line);

    // Tokens tile the line: contiguous ranges covering every byte, and
    // every range slices cleanly back out of the source.
    let mut offset = 0u32;
    for token in &tokens {
        assert_eq!(u32::from(token.range.start()), offset);
        assert!(token.range.end() >= token.range.start());
        offset = u32::from(token.range.end());
        let _ = token.text(&line);
    }
    assert_eq!(offset as usize, line.len());

    let commands = sample_commands();

    // Probe completion at a seeded cursor, including one past the end.
    let cursor = u32::from(data[0]) % (line.len() as u32 + 2);
    if let Some(result) = complete(&line, TextSize::from(cursor), &commands) {
        assert!(u32::from(result.from) <= cursor);
        for item in &result.items {
            assert!(!item.label.is_empty());
        }
    }

    // Round-trip the line through the session state machine.
    let mut session = ConsoleSession::new(commands);
    session.set_buffer(line.clone());
    let sent = session.begin_submit().unwrap();
    assert_eq!(sent, line);
    session.finish_submit(SubmitOutcome::resolved("<div/>", None));
    assert_eq!(session.history().len(), 1);

    session.history_previous();
    assert_eq!(session.buffer(), line);
    session.history_next();
    assert!(session.buffer().is_empty());
});
