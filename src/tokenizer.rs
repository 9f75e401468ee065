//! Incremental delimiter-based tokenizer.
//!
//! [`Tokenizer`] frames a growing byte buffer into tokens separated by an
//! arbitrary (possibly multi-byte) delimiter. Bytes are appended as they
//! arrive from the socket; complete tokens are handed out as borrowed
//! slices and the unterminated tail stays in the buffer as carry for the
//! next chunk.
//!
//! ```
//! use slirc_bot::tokenizer::Tokenizer;
//!
//! let mut tok = Tokenizer::new();
//! tok.extend(b"PING :a\r\nPRIV");
//! assert_eq!(tok.tokenize(Some(b"\r\n")), Some(&b"PING :a"[..]));
//! assert_eq!(tok.tokenize(Some(b"\r\n")), None);
//!
//! tok.extend(b"MSG #c :hi\r\n");
//! assert_eq!(tok.tokenize(Some(b"\r\n")), Some(&b"PRIVMSG #c :hi"[..]));
//! ```

use bytes::{Buf, BytesMut};

/// Record terminator on the wire.
pub const CRLF: &[u8] = b"\r\n";

/// Boundary between the parameter list and the trailing free text.
pub const TRAILING_MARKER: &[u8] = b" :";

/// Default upper bound for a single record, terminator included.
pub const MAX_LINE_LEN: usize = 8191;

/// Incremental tokenizer over an owned, growing buffer.
///
/// The cursor only moves forward on a successful match, so bytes handed out
/// by one call are never scanned again. Consumed bytes are released lazily
/// the next time the buffer is extended.
#[derive(Debug, Default, Clone)]
pub struct Tokenizer {
    buffer: BytesMut,
    cursor: usize,
}

impl Tokenizer {
    /// Create an empty tokenizer.
    pub fn new() -> Self {
        Self::with_capacity(8192)
    }

    /// Create an empty tokenizer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            cursor: 0,
        }
    }

    /// Drop consumed bytes from the front of the buffer.
    fn advance_consumed(&mut self) {
        if self.cursor > 0 {
            self.buffer.advance(self.cursor);
            self.cursor = 0;
        }
    }

    /// Append a newly arrived chunk after any carried-over tail.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.advance_consumed();
        self.buffer.extend_from_slice(chunk);
    }

    /// Return the next token ending at `delimiter`.
    ///
    /// With `Some(delimiter)`, scans forward from the cursor. On a match the
    /// bytes before the delimiter are returned and the cursor moves past the
    /// delimiter; otherwise `None` is returned and the cursor stays put.
    ///
    /// With `None`, the rest of the buffer from the cursor is returned and
    /// consumed. An empty remainder yields `None`.
    pub fn tokenize(&mut self, delimiter: Option<&[u8]>) -> Option<&[u8]> {
        let start = self.cursor;
        let rest = &self.buffer[start..];

        match delimiter {
            Some(delim) if !delim.is_empty() => {
                let pos = find(rest, delim)?;
                self.cursor = start + pos + delim.len();
                Some(&self.buffer[start..start + pos])
            }
            _ => {
                if rest.is_empty() {
                    return None;
                }
                self.cursor = self.buffer.len();
                Some(&self.buffer[start..])
            }
        }
    }

    /// The unconsumed tail, without consuming it.
    pub fn carry(&self) -> &[u8] {
        &self.buffer[self.cursor..]
    }

    /// Number of unconsumed bytes.
    pub fn pending(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    /// Whether there is nothing left to tokenize.
    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Discard everything, including the carry.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }
}

impl From<&[u8]> for Tokenizer {
    fn from(bytes: &[u8]) -> Self {
        let mut tok = Self::with_capacity(bytes.len());
        tok.extend(bytes);
        tok
    }
}

impl From<&str> for Tokenizer {
    fn from(s: &str) -> Self {
        Self::from(s.as_bytes())
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
