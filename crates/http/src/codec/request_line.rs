//! Request line parsing.
//!
//! The accepted grammar is deliberately narrow:
//!
//! ```text
//! METHOD SP TARGET SP HTTP/1.1 CRLF
//! ```
//!
//! with exactly one space between tokens, a method made only of ASCII
//! uppercase letters, and the version spelled literally `HTTP/1.1`.

use http::Method;

use crate::ensure;
use crate::protocol::{ParseError, RequestLine};
use crate::utils::{CRLF, find_crlf};

const HTTP_11: &[u8] = b"HTTP/1.1";

/// Tries to parse a request line from the start of `data`.
///
/// # Returns
///
/// - `Ok(Some((line, consumed)))` once a full line is present, `consumed`
///   includes the CRLF
/// - `Ok(None)` if no CRLF has arrived yet
///
/// # Errors
///
/// Returns [`ParseError::MalformedRequestLine`] for a complete line that does
/// not follow the grammar above.
pub(crate) fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(end_of_line) = find_crlf(data) else {
        return Ok(None);
    };

    let line = &data[..end_of_line];
    let mut parts = line.split(|b| *b == b' ');
    let (Some(method), Some(target), Some(version), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::malformed_request_line("expected exactly three space separated parts"));
    };

    ensure!(!method.is_empty(), ParseError::malformed_request_line("empty method"));
    ensure!(
        method.iter().all(u8::is_ascii_uppercase),
        ParseError::malformed_request_line("method must be uppercase ascii letters")
    );
    ensure!(!target.is_empty(), ParseError::malformed_request_line("empty request target"));
    ensure!(version == HTTP_11, ParseError::malformed_request_line("unsupported http version"));

    let method = Method::from_bytes(method).map_err(|_e| ParseError::malformed_request_line("invalid method"))?;
    let target = std::str::from_utf8(target)
        .map_err(|_e| ParseError::malformed_request_line("request target is not utf-8"))?
        .to_owned();

    Ok(Some((RequestLine::new(method, target), end_of_line + CRLF.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Version;

    fn assert_malformed(line: &[u8]) {
        match parse_request_line(line) {
            Err(ParseError::MalformedRequestLine { .. }) => {}
            other => panic!("expected malformed request line for {:?}, got {other:?}", String::from_utf8_lossy(line)),
        }
    }

    #[test]
    fn good_get_request_line() {
        let (line, consumed) = parse_request_line(b"GET / HTTP/1.1\r\nHost: localhost\r\n").unwrap().unwrap();

        assert_eq!(line.method(), &Method::GET);
        assert_eq!(line.target(), "/");
        assert_eq!(line.version(), Version::HTTP_11);
        assert_eq!(consumed, 16);
    }

    #[test]
    fn target_is_kept_verbatim() {
        let (line, _) = parse_request_line(b"POST /coffee?size=large&milk=%20oat HTTP/1.1\r\n").unwrap().unwrap();

        assert_eq!(line.method(), &Method::POST);
        assert_eq!(line.target(), "/coffee?size=large&milk=%20oat");
    }

    #[test]
    fn extension_method() {
        let (line, _) = parse_request_line(b"BREW /pot HTTP/1.1\r\n").unwrap().unwrap();

        assert_eq!(line.method().as_str(), "BREW");
    }

    #[test]
    fn incomplete_line_waits() {
        assert!(parse_request_line(b"GET / HTTP/1.1").unwrap().is_none());
        assert!(parse_request_line(b"GET / HTTP/1.1\r").unwrap().is_none());
        assert!(parse_request_line(b"").unwrap().is_none());
    }

    #[test]
    fn wrong_part_count() {
        assert_malformed(b"/coffee HTTP/1.1\r\n");
        assert_malformed(b"GET /coffee HTTP/1.1 extra\r\n");
        assert_malformed(b"GET  /coffee HTTP/1.1\r\n");
        assert_malformed(b"\r\n");
    }

    #[test]
    fn bad_method() {
        assert_malformed(b"get / HTTP/1.1\r\n");
        assert_malformed(b"Get / HTTP/1.1\r\n");
        assert_malformed(b"G3T / HTTP/1.1\r\n");
        assert_malformed(b" / HTTP/1.1\r\n");
    }

    #[test]
    fn bad_version() {
        assert_malformed(b"GET / HTTP/1.0\r\n");
        assert_malformed(b"GET / HTTP/2\r\n");
        assert_malformed(b"GET / FOO/1.1\r\n");
        assert_malformed(b"GET / 1.1\r\n");
    }

    #[test]
    fn empty_target() {
        assert_malformed(b"GET  HTTP/1.1\r\n");
    }
}
