//! Property-based tests for incremental framing.
//!
//! Uses proptest to generate record sequences and arbitrary read
//! boundaries and verify that:
//! 1. Chunked feeding yields the same records, in order, as feeding whole
//! 2. The unterminated fragment is retained as carry
//! 3. Record parsing never panics on arbitrary input

use proptest::prelude::*;
use slirc_bot::tokenizer::{Tokenizer, CRLF};
use slirc_bot::{parse_event, ConnectionState};

// =============================================================================
// STRATEGIES
// =============================================================================

/// Record body: printable ASCII plus spaces and colons, no terminator bytes.
fn record_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,40}").expect("valid regex")
}

/// Trailing fragment that never contains a full terminator.
fn fragment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,20}\r?").expect("valid regex")
}

fn chunk_sizes_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..16, 1..64)
}

fn drain(tok: &mut Tokenizer, out: &mut Vec<Vec<u8>>) {
    while let Some(record) = tok.tokenize(Some(CRLF)) {
        out.push(record.to_vec());
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn chunking_is_invariant(
        records in prop::collection::vec(record_strategy(), 0..12),
        fragment in fragment_strategy(),
        sizes in chunk_sizes_strategy(),
    ) {
        let mut stream = Vec::new();
        for record in &records {
            stream.extend_from_slice(record.as_bytes());
            stream.extend_from_slice(CRLF);
        }
        stream.extend_from_slice(fragment.as_bytes());

        let mut whole = Tokenizer::new();
        whole.extend(&stream);
        let mut expected = Vec::new();
        drain(&mut whole, &mut expected);

        let mut chunked = Tokenizer::new();
        let mut actual = Vec::new();
        let mut offset = 0;
        let mut sizes = sizes.iter().cycle();
        while offset < stream.len() {
            let size = (*sizes.next().unwrap()).min(stream.len() - offset);
            chunked.extend(&stream[offset..offset + size]);
            drain(&mut chunked, &mut actual);
            offset += size;
        }

        let wanted: Vec<Vec<u8>> = records.iter().map(|r| r.as_bytes().to_vec()).collect();
        prop_assert_eq!(&expected, &wanted);
        prop_assert_eq!(&actual, &wanted);
        prop_assert_eq!(chunked.carry(), fragment.as_bytes());
        prop_assert_eq!(whole.carry(), fragment.as_bytes());
    }

    #[test]
    fn parsing_never_panics(line in "\\PC{0,80}") {
        let state = ConnectionState::new("net", "bot");
        let _ = parse_event(&line, &state);
    }

    #[test]
    fn trailing_text_survives_colons(
        text in prop::string::string_regex("[a-z:]{1,20}( [a-z:]{1,10}){0,4}").expect("valid regex"),
    ) {
        let state = ConnectionState::new("net", "bot");
        let line = format!(":nick!user@host PRIVMSG #chan :{text}");
        let event = parse_event(&line, &state).unwrap();
        prop_assert_eq!(event.message.as_deref(), Some(text.as_str()));
        prop_assert_eq!(event.args, vec!["#chan".to_string()]);
    }
}
