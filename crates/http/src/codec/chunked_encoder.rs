use std::io::Write;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

use crate::ensure;
use crate::protocol::{PayloadItem, SendError};
use crate::utils::{CRLF, FastWrite};

/// Frames payload items with chunked transfer-encoding.
///
/// A chunk is written as `<lowercase hex size>\r\n<data>\r\n` and the end of the
/// stream as the zero-size chunk `0\r\n\r\n`. Nothing may follow the end, and
/// an empty chunk is rejected since it would read as the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
    send_size: usize,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false, send_size: 0 }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }

    /// Total payload bytes framed so far, excluding chunk size lines.
    pub fn send_size(&self) -> usize {
        self.send_size
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        ensure!(!self.eof, SendError::invalid_body("chunk written after the terminating chunk"));

        match item {
            PayloadItem::Chunk(mut bytes) => {
                let size = bytes.remaining();
                // a zero-size chunk is the terminator on the wire
                ensure!(size > 0, SendError::invalid_body("empty chunk, end the body with Eof instead"));
                write!(FastWrite(dst), "{size:x}\r\n")?;
                dst.reserve(size + CRLF.len());
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(len);
                }
                dst.extend_from_slice(CRLF);
                self.send_size += size;
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.extend_from_slice(b"0\r\n\r\n");
                Ok(())
            }
        }
    }
}
