//! Staged response serialization.
//!
//! HTTP/1.1 output has a fixed order on the wire, so [`ResponseWriter`] walks
//! through it as a state machine:
//!
//! ```text
//! StatusLine -> Headers -> Body -> (chunked only) Trailers -> Complete
//! ```
//!
//! A call made in the wrong state fails with [`SendError::WrongState`] before
//! anything is encoded, leaving both the sink and the state untouched.

use bytes::{Buf, BytesMut};
use http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::debug;

use crate::codec::{ChunkedEncoder, Head, HeaderEncoder, trailer_names};
use crate::ensure;
use crate::protocol::{Headers, PayloadItem, SendError, WriterState};

/// Writes one response to an [`AsyncWrite`] sink.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
    buffer: BytesMut,
    state: WriterState,
    header_encoder: HeaderEncoder,
    chunked_encoder: ChunkedEncoder,
    trailer_declared: bool,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: BytesMut::new(),
            state: WriterState::StatusLine,
            header_encoder: HeaderEncoder,
            chunked_encoder: ChunkedEncoder::new(),
            trailer_declared: false,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes `HTTP/1.1 <code> <reason>\r\n`. Only 200, 400 and 500 are supported.
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), SendError> {
        self.expect_state(WriterState::StatusLine)?;
        self.header_encoder.encode(Head::StatusLine(status), &mut self.buffer)?;
        self.flush().await?;

        debug!(status = %status, "wrote status line");
        self.state = WriterState::Headers;
        Ok(())
    }

    /// Writes every header followed by the empty line that ends the block.
    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), SendError> {
        self.expect_state(WriterState::Headers)?;
        self.header_encoder.encode(Head::Fields(headers), &mut self.buffer)?;
        self.flush().await?;

        self.trailer_declared = trailer_names(headers).next().is_some();
        debug!(header_count = headers.len(), trailer_declared = self.trailer_declared, "wrote headers");
        self.state = WriterState::Body;
        Ok(())
    }

    /// Writes `body` verbatim and returns its length.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, SendError> {
        self.expect_state(WriterState::Body)?;
        self.buffer.extend_from_slice(body);
        self.flush().await?;
        Ok(body.len())
    }

    /// Writes `chunk` as one chunk of a chunked body and returns the number of
    /// bytes put on the wire, framing included.
    ///
    /// An empty `chunk` fails with [`SendError::InvalidBody`] and writes nothing,
    /// since a zero-size chunk would end the body; finish with
    /// [`write_chunked_body_done`](Self::write_chunked_body_done) instead.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, SendError> {
        self.write_payload(PayloadItem::Chunk(chunk)).await
    }

    /// Writes the terminating `0\r\n\r\n` chunk. After it only
    /// [`write_trailers`](Self::write_trailers) is allowed.
    pub async fn write_chunked_body_done(&mut self) -> Result<usize, SendError> {
        let written = self.write_payload(PayloadItem::<&[u8]>::Eof).await?;
        self.state = WriterState::Trailers;
        Ok(written)
    }

    /// Writes the trailer fields named by the `trailer` header of `headers`,
    /// with values taken from `headers` as well.
    ///
    /// Nothing is written if `headers` names no trailer. Otherwise the response
    /// headers must have declared a `trailer` header too.
    pub async fn write_trailers(&mut self, headers: &Headers) -> Result<(), SendError> {
        self.expect_state(WriterState::Trailers)?;
        if trailer_names(headers).next().is_none() {
            return Ok(());
        }
        ensure!(self.trailer_declared, SendError::TrailerNotDeclared);

        self.header_encoder.encode(Head::Trailers(headers), &mut self.buffer)?;
        self.flush().await?;

        debug!("wrote trailers");
        self.state = WriterState::Complete;
        Ok(())
    }

    /// Flushes and shuts down the write half of the sink.
    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        self.flush().await?;
        Ok(self.writer.shutdown().await?)
    }

    async fn write_payload<D: Buf>(&mut self, item: PayloadItem<D>) -> Result<usize, SendError> {
        self.expect_state(WriterState::Body)?;
        self.chunked_encoder.encode(item, &mut self.buffer)?;
        let written = self.buffer.len();
        self.flush().await?;
        Ok(written)
    }

    #[inline]
    fn expect_state(&self, expected: WriterState) -> Result<(), SendError> {
        ensure!(self.state == expected, SendError::wrong_state(expected, self.state));
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SendError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let result = self.writer.write_all(&self.buffer).await;
        self.buffer.clear();
        result?;
        Ok(self.writer.flush().await?)
    }
}
