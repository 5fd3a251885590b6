//! Response-side protocol types.
//!
//! The writer only speaks a handful of status codes; [`reason_phrase`] is the
//! single place that decides which ones.

use http::StatusCode;

/// Progress of a response writer through the fixed HTTP/1.1 output order.
///
/// `Trailers` is entered by the terminating zero-length chunk and `Complete` by
/// writing the trailer block; plain bodies stay in `Body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    StatusLine,
    Headers,
    Body,
    Trailers,
    Complete,
}

/// The reason phrase for a supported status code, `None` for every other code.
pub fn reason_phrase(status: StatusCode) -> Option<&'static str> {
    match status {
        StatusCode::OK | StatusCode::BAD_REQUEST | StatusCode::INTERNAL_SERVER_ERROR => status.canonical_reason(),
        _ => None,
    }
}
