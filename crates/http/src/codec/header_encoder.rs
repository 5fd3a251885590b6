//! HTTP head encoder implementation for serializing response status lines,
//! header blocks and trailer blocks.
//!
//! Each [`Head`] item maps to one contiguous piece of the response:
//!
//! - [`Head::StatusLine`]: `HTTP/1.1 <code> <reason>\r\n`
//! - [`Head::Fields`]: `name: value\r\n` per header, then `\r\n`
//! - [`Head::Trailers`]: `name: value \r\n` per field named by the `trailer`
//!   header, then `\r\n`

use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::StatusCode;
use tokio_util::codec::Encoder;
use tracing::error;

use crate::ensure;
use crate::protocol::{Headers, SendError, is_name_byte, reason_phrase};
use crate::utils::{CRLF, FastWrite};

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 1024;

/// One piece of response head output.
#[derive(Debug, Clone, Copy)]
pub enum Head<'a> {
    StatusLine(StatusCode),
    Fields(&'a Headers),
    Trailers(&'a Headers),
}

/// Encoder for the non-body parts of a response, implementing the [`Encoder`] trait.
#[derive(Debug, Default)]
pub struct HeaderEncoder;

impl Encoder<Head<'_>> for HeaderEncoder {
    type Error = SendError;

    /// Encodes one head item into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::UnsupportedStatus`] for a status line whose code is
    /// not one of 200, 400 or 500, and [`SendError::InvalidField`] for a field
    /// that would break the head apart: a name outside the header name
    /// alphabet or a value holding CR or LF. Nothing is written in either case.
    fn encode(&mut self, item: Head<'_>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Head::StatusLine(status) => {
                let Some(reason) = reason_phrase(status) else {
                    error!(status = %status, "unsupported status code");
                    return Err(SendError::UnsupportedStatus(status));
                };
                write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", status.as_str(), reason)?;
            }

            Head::Fields(headers) => {
                for (name, value) in headers.iter() {
                    check_field(name, value)?;
                }

                dst.reserve(INIT_HEADER_SIZE);
                for (name, value) in headers.iter() {
                    dst.put_slice(name.as_bytes());
                    dst.put_slice(b": ");
                    dst.put_slice(value.as_bytes());
                    dst.put_slice(CRLF);
                }
                dst.put_slice(CRLF);
            }

            Head::Trailers(headers) => {
                for name in trailer_names(headers) {
                    check_field(name, headers.get(name).unwrap_or_default())?;
                }

                // every trailer line keeps a space before its CRLF
                for name in trailer_names(headers) {
                    dst.put_slice(name.as_bytes());
                    dst.put_slice(b": ");
                    dst.put_slice(headers.get(name).unwrap_or_default().as_bytes());
                    dst.put_slice(b" \r\n");
                }
                dst.put_slice(CRLF);
            }
        }
        Ok(())
    }
}

fn check_field(name: &str, value: &str) -> Result<(), SendError> {
    ensure!(
        !name.is_empty() && name.bytes().all(is_name_byte) && !value.bytes().any(|b| b == b'\r' || b == b'\n'),
        SendError::InvalidField { name: name.to_owned() }
    );
    Ok(())
}

/// The field names listed by the `trailer` header, trimmed, empty entries skipped.
pub(crate) fn trailer_names(headers: &Headers) -> impl Iterator<Item = &str> {
    headers.get("trailer").unwrap_or_default().split(',').map(str::trim).filter(|name| !name.is_empty())
}
