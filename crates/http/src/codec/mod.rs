//! HTTP codec module for decoding requests and encoding responses
//!
//! This module provides the byte-level half of the crate. It uses a state
//! machine pattern for request parsing and `tokio_util` encoders for every
//! piece of response output.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: incremental request parser
//!   - [`parse_from_stream`]: drives the decoder over any [`AsyncRead`]
//!
//! - Response handling:
//!   - [`HeaderEncoder`]: status line, header block and trailer block
//!   - [`ChunkedEncoder`]: chunked transfer-encoding framing
//!
//! # Example
//!
//! ```no_run
//! use httpfromtcp::codec::parse_from_stream;
//!
//! # async fn run() -> Result<(), httpfromtcp::protocol::ParseError> {
//! let input: &[u8] = b"GET /path HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";
//! let request = parse_from_stream(input).await?;
//! assert_eq!(request.target(), "/path");
//! # Ok(())
//! # }
//! ```

mod chunked_encoder;
mod header_encoder;
mod request_decoder;
mod request_line;

pub use chunked_encoder::ChunkedEncoder;
pub(crate) use header_encoder::trailer_names;
pub use header_encoder::{Head, HeaderEncoder};
pub use request_decoder::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEAD_BYTES, ParseState, RequestDecoder};

use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use crate::protocol::{ParseError, Request};

/// Initial capacity of the read buffer; it grows when a request needs more.
pub const INIT_BUFFER_SIZE: usize = 8 * 1024;

/// Reads a single request from `reader`.
///
/// Bytes are parsed as they arrive, however the reader chooses to split them.
///
/// # Errors
///
/// Any [`ParseError`]; a reader that ends before sending a single byte gives
/// [`ParseError::ConnectionClosed`].
pub async fn parse_from_stream<R>(reader: R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut framed_read = FramedRead::with_capacity(reader, RequestDecoder::new(), INIT_BUFFER_SIZE);
    read_request(&mut framed_read).await
}

/// Like [`parse_from_stream`], but gives up with [`ParseError::Timeout`] when the
/// full request has not arrived within `timeout`.
pub async fn parse_from_stream_with_timeout<R>(reader: R, timeout: Duration) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    tokio::time::timeout(timeout, parse_from_stream(reader)).await.map_err(|_elapsed| ParseError::Timeout(timeout))?
}

/// Pulls the next request out of an already framed reader.
pub(crate) async fn read_request<R>(framed_read: &mut FramedRead<R, RequestDecoder>) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    match framed_read.next().await {
        Some(result) => result,
        None => Err(ParseError::ConnectionClosed),
    }
}
