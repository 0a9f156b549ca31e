//! Newline framing for the stdio transport.
//!
//! `FramedRead` ends the stream after the first decoder error, so oversized
//! and non-UTF-8 lines are yielded as [`Frame::Malformed`] items instead and
//! the server keeps reading.

use std::io;
use tokio_util::bytes::{Bytes, BytesMut};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder};

/// Longest accepted message line, in bytes.
pub const MAX_LINE_LENGTH: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Line(String),
    Malformed(&'static str),
}

pub struct LineFramer {
    inner: AnyDelimiterCodec,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), max_length),
        }
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineFramer {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        into_frame(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        into_frame(self.inner.decode_eof(buf))
    }
}

fn into_frame(chunk: Result<Option<Bytes>, AnyDelimiterCodecError>) -> io::Result<Option<Frame>> {
    match chunk {
        Ok(Some(bytes)) => Ok(Some(match std::str::from_utf8(&bytes) {
            Ok(line) => Frame::Line(line.to_string()),
            Err(_) => Frame::Malformed("line is not valid UTF-8"),
        })),
        Ok(None) => Ok(None),
        // the codec discards the rest of the line on the next call
        Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => {
            Ok(Some(Frame::Malformed("line exceeds the maximum length")))
        }
        Err(AnyDelimiterCodecError::Io(e)) => Err(e),
    }
}
