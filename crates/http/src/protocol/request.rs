//! Parsed HTTP request types.
//!
//! A [`Request`] is only ever built by the request decoder once parsing has
//! finished, and hands out shared references afterwards, so it cannot change
//! once a handler sees it.

use bytes::Bytes;
use http::{Method, Version};

use crate::protocol::Headers;

/// The first line of a request: method, target and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    target: String,
    version: Version,
}

impl RequestLine {
    pub(crate) fn new(method: Method, target: String) -> Self {
        Self { method, target, version: Version::HTTP_11 }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The raw request target, path and query exactly as sent.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Always HTTP/1.1, anything else is rejected while parsing.
    pub fn version(&self) -> Version {
        self.version
    }
}

/// A fully parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    request_line: RequestLine,
    headers: Headers,
    body: Bytes,
}

impl Request {
    pub(crate) fn new(request_line: RequestLine, headers: Headers, body: Bytes) -> Self {
        Self { request_line, headers, body }
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn method(&self) -> &Method {
        self.request_line.method()
    }

    pub fn target(&self) -> &str {
        self.request_line.target()
    }

    pub fn version(&self) -> Version {
        self.request_line.version()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The raw body bytes, empty when no `content-length` was sent.
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
