//! HTTP request decoder module
//!
//! This module turns raw bytes into a [`Request`] using an incremental state
//! machine. It can be fed any fragmentation of the input, one byte at a time or
//! everything at once, and always produces the same result.
//!
//! # State Machine
//!
//! ```text
//! Initialized -> ParsingHeaders -> ParsingBody -> Done
//! ```
//!
//! States only ever move forward. Each call to [`RequestDecoder::step`] runs
//! exactly one state's logic and reports how many bytes it consumed; the
//! decoder keeps stepping until a step consumes nothing, which means either more
//! input is needed or the request is complete.
//!
//! # Example
//!
//! ```no_run
//! use httpfromtcp::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n"[..]);
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.target(), "/");
//! ```

use std::mem;

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::request_line::parse_request_line;
use crate::ensure;
use crate::protocol::{Headers, ParseError, Request, RequestLine};

/// Default maximum size in bytes of the request line plus header block
pub const DEFAULT_MAX_HEAD_BYTES: usize = 8 * 1024;

/// Default maximum `content-length` a request may declare
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Parse progress of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Waiting for a complete request line
    Initialized,
    /// Reading header lines until the empty line
    ParsingHeaders,
    /// Waiting for `content-length` bytes of body
    ParsingBody,
    /// The request is complete
    Done,
}

/// A decoder that produces one [`Request`] from a byte stream.
///
/// Partially received lines and body bytes stay in the source buffer until they
/// can be consumed in full, so the buffer owned by the caller (usually a
/// `FramedRead`) is the only accumulator and grows as needed.
#[derive(Debug)]
pub struct RequestDecoder {
    state: ParseState,
    request_line: Option<RequestLine>,
    headers: Headers,
    content_length: Option<u64>,
    body: Bytes,
    head_bytes: usize,
    max_head_bytes: usize,
    max_body_bytes: usize,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a decoder that rejects a request line plus header block longer
    /// than `max_head_bytes`.
    pub fn with_max_head_bytes(max_head_bytes: usize) -> Self {
        Self::with_limits(max_head_bytes, DEFAULT_MAX_BODY_BYTES)
    }

    /// Creates a decoder with both size limits. A request declaring a
    /// `content-length` above `max_body_bytes` is rejected before its body is read.
    pub fn with_limits(max_head_bytes: usize, max_body_bytes: usize) -> Self {
        Self { max_head_bytes, max_body_bytes, ..Default::default() }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Runs one state transition against `src`, removing what it consumed.
    ///
    /// Returns the number of bytes consumed; `0` means the state is waiting for
    /// more input, or that the request reached [`ParseState::Done`] without a body.
    pub fn step(&mut self, src: &mut BytesMut) -> Result<usize, ParseError> {
        let (next, consumed) = match self.state {
            ParseState::Initialized => match parse_request_line(src)? {
                Some((request_line, consumed)) => {
                    trace!(method = %request_line.method(), target = request_line.target(), "parsed request line");
                    src.advance(consumed);
                    self.head_bytes += consumed;
                    self.request_line = Some(request_line);
                    (ParseState::ParsingHeaders, consumed)
                }
                None => (ParseState::Initialized, 0),
            },

            ParseState::ParsingHeaders => {
                let (consumed, done) = self.headers.parse(src)?;
                src.advance(consumed);
                self.head_bytes += consumed;
                if done {
                    trace!(header_count = self.headers.len(), "parsed headers");
                    (ParseState::ParsingBody, consumed)
                } else {
                    (ParseState::ParsingHeaders, consumed)
                }
            }

            ParseState::ParsingBody => match self.content_length()? {
                None => (ParseState::Done, 0),
                Some(expected) => {
                    let received = src.len();
                    ensure!(received as u64 <= expected, ParseError::BodyOverflow { expected, received });
                    if received as u64 == expected {
                        trace!(body_size = received, "parsed body");
                        self.body = src.split_to(received).freeze();
                        (ParseState::Done, received)
                    } else {
                        (ParseState::ParsingBody, 0)
                    }
                }
            },

            ParseState::Done => (ParseState::Done, 0),
        };

        self.state = next;
        Ok(consumed)
    }

    /// The declared body length, parsed once and cached.
    fn content_length(&mut self) -> Result<Option<u64>, ParseError> {
        if self.content_length.is_none() {
            let Some(value) = self.headers.get("content-length").filter(|value| !value.is_empty()) else {
                return Ok(None);
            };

            ensure!(value.bytes().all(|b| b.is_ascii_digit()), ParseError::invalid_content_length(value));
            let length = value.parse::<u64>().map_err(|_e| ParseError::invalid_content_length(value))?;
            ensure!(length <= self.max_body_bytes as u64, ParseError::too_large_body(length, self.max_body_bytes));
            self.content_length = Some(length);
        }

        Ok(self.content_length)
    }

    /// Builds the finished request, leaving the decoder in [`ParseState::Done`].
    fn finish(&mut self) -> Result<Option<Request>, ParseError> {
        self.state = ParseState::Done;
        let request_line = self
            .request_line
            .take()
            .ok_or_else(|| ParseError::malformed_request_line("connection closed before the request line ended"))?;

        Ok(Some(Request::new(request_line, mem::take(&mut self.headers), mem::take(&mut self.body))))
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self {
            state: ParseState::Initialized,
            request_line: None,
            headers: Headers::new(),
            content_length: None,
            body: Bytes::new(),
            head_bytes: 0,
            max_head_bytes: DEFAULT_MAX_HEAD_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Steps the state machine as far as the buffered bytes allow
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: the request is complete, returned exactly once
    /// - `Ok(None)`: need more data to proceed, or the request was already returned
    /// - `Err(_)`: encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.state == ParseState::Done {
            return Ok(None);
        }

        loop {
            let consumed = self.step(src)?;
            ensure!(self.head_bytes <= self.max_head_bytes, ParseError::too_large_header(self.head_bytes, self.max_head_bytes));

            if self.state == ParseState::Done {
                return self.finish();
            }

            if consumed == 0 {
                // whatever is buffered now is an unfinished head line
                if matches!(self.state, ParseState::Initialized | ParseState::ParsingHeaders) {
                    let current_size = self.head_bytes + src.len();
                    ensure!(
                        current_size <= self.max_head_bytes,
                        ParseError::too_large_header(current_size, self.max_head_bytes)
                    );
                }
                return Ok(None);
            }
        }
    }

    /// Finishes the request once the peer stopped sending.
    ///
    /// A request still waiting for headers is completed with what it has, unless
    /// those headers declared a body. One still waiting for its body fails with
    /// [`ParseError::BodyUnderflow`], and a
    /// half received request line is malformed. A stream that closed before
    /// sending anything yields no request at all.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(request) = self.decode(src)? {
            return Ok(Some(request));
        }

        match self.state {
            ParseState::Done => Ok(None),
            ParseState::Initialized if src.is_empty() => Ok(None),
            ParseState::Initialized => {
                Err(ParseError::malformed_request_line("connection closed before the request line ended"))
            }
            ParseState::ParsingHeaders => {
                trace!(pending = src.len(), "stream ended inside the header block");
                // the unfinished line is header data, not body
                match self.content_length()? {
                    Some(expected) if expected > 0 => Err(ParseError::BodyUnderflow { expected, received: 0 }),
                    _ => self.finish(),
                }
            }
            ParseState::ParsingBody => match self.content_length()? {
                Some(expected) if (src.len() as u64) < expected => {
                    Err(ParseError::BodyUnderflow { expected, received: src.len() })
                }
                _ => self.finish(),
            },
        }
    }
}
