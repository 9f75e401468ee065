//! Record codec for `tokio_util::codec` framing.
//!
//! [`LineCodec`] feeds every chunk read from the socket into a
//! [`Tokenizer`] and yields one record per CRLF terminator, so records
//! survive arbitrary TCP read boundaries.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::error::ProtocolError;
use crate::tokenizer::{Tokenizer, CRLF};

pub use crate::tokenizer::MAX_LINE_LEN;

/// CRLF line codec backed by the incremental tokenizer.
#[derive(Debug)]
pub struct LineCodec {
    tokenizer: Tokenizer,
    max_line_len: usize,
}

impl LineCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_line_len(MAX_LINE_LEN)
    }

    /// Create a codec with a custom line limit.
    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            tokenizer: Tokenizer::with_capacity(max_line_len.min(65536)),
            max_line_len,
        }
    }

    /// Strip anything from the first CR or LF onwards so a caller-built
    /// record can never smuggle a second record onto the wire.
    pub fn sanitize(mut line: String) -> String {
        if let Some(pos) = line.find(['\r', '\n']) {
            line.truncate(pos);
        }
        line
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if !src.is_empty() {
            let chunk = src.split();
            self.tokenizer.extend(&chunk);
        }

        let limit = self.max_line_len;
        match self.tokenizer.tokenize(Some(CRLF)) {
            Some(record) => {
                if record.len() + CRLF.len() > limit {
                    return Err(ProtocolError::MessageTooLong {
                        actual: record.len() + CRLF.len(),
                        limit,
                    });
                }
                Ok(Some(String::from_utf8_lossy(record).into_owned()))
            }
            None => {
                let pending = self.tokenizer.pending();
                if pending > limit {
                    return Err(ProtocolError::MessageTooLong {
                        actual: pending,
                        limit,
                    });
                }
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if let Some(record) = self.decode(src)? {
            return Ok(Some(record));
        }
        if !self.tokenizer.is_empty() {
            debug!(
                bytes = self.tokenizer.pending(),
                "stream closed with an unterminated record, dropping it"
            );
            self.tokenizer.clear();
        }
        Ok(None)
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let line = Self::sanitize(line);
        if line.len() + CRLF.len() > self.max_line_len {
            return Err(ProtocolError::MessageTooLong {
                actual: line.len() + CRLF.len(),
                limit: self.max_line_len,
            });
        }
        dst.reserve(line.len() + CRLF.len());
        dst.put_slice(line.as_bytes());
        dst.put_slice(CRLF);
        Ok(())
    }
}
