//! Utility macros and functions for the HTTP crate.
//!
//! This module provides helper macros and functions that are used internally
//! by the HTTP crate implementation.

use std::io;

use bytes::{BufMut, BytesMut};

/// Line terminator used by every HTTP/1.1 start line, header and chunk.
pub(crate) const CRLF: &[u8] = b"\r\n";

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// It's useful for validation checks where you want to return early with an error
/// if some condition is not satisfied.
///
/// # Example
///
/// ```ignore
/// ensure!(self.state == expected, SendError::wrong_state(expected, self.state));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Index of the first `\r\n` in `bytes`, if any.
#[inline]
pub(crate) fn find_crlf(bytes: &[u8]) -> Option<usize> {
    bytes.windows(CRLF.len()).position(|window| window == CRLF)
}

/// Fast writer implementation for writing to BytesMut.
///
/// Formatting goes straight into the buffer instead of through an
/// intermediate `String`.
pub(crate) struct FastWrite<'a>(pub(crate) &'a mut BytesMut);

impl io::Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_crlf() {
        assert_eq!(find_crlf(b"GET / HTTP/1.1\r\nHost: a\r\n"), Some(14));
        assert_eq!(find_crlf(b"\r\n"), Some(0));
        assert_eq!(find_crlf(b"no line end\r"), None);
        assert_eq!(find_crlf(b""), None);
    }

    #[test]
    fn fast_write_appends_formatted_output() {
        use std::io::Write;

        let mut dst = BytesMut::from(&b"1a"[..]);
        write!(FastWrite(&mut dst), "\r\n{:x}", 255).unwrap();

        assert_eq!(&dst[..], b"1a\r\nff");
    }
}
