//! Fuzz target for record framing and parsing
//!
//! Feeds arbitrary bytes through the tokenizer and every complete record
//! through the parser; neither may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_bot::tokenizer::{Tokenizer, CRLF};
use slirc_bot::{parse_event, ConnectionState};

fuzz_target!(|data: &[u8]| {
    let state = ConnectionState::new("fuzz", "bot");

    let split = data.first().map(|b| *b as usize % (data.len() + 1)).unwrap_or(0);
    let mut tok = Tokenizer::new();
    for chunk in [&data[..split], &data[split..]] {
        tok.extend(chunk);
        while let Some(record) = tok.tokenize(Some(CRLF)) {
            let line = String::from_utf8_lossy(record);
            let _ = parse_event(&line, &state);
        }
    }
    let _ = tok.tokenize(None);
});
