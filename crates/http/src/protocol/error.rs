use std::error::Error;
use std::io;
use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

use crate::protocol::WriterState;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },

    #[error("handler error: {source}")]
    HandlerError { source: Box<dyn Error + Send + Sync> },
}

impl HttpError {
    pub fn handler<E: Into<Box<dyn Error + Send + Sync>>>(e: E) -> Self {
        Self::HandlerError { source: e.into() }
    }
}

/// Why a single header line was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    #[error("header line has no colon")]
    MissingColon,

    #[error("header name contains whitespace before the colon")]
    WhitespaceBeforeColon,

    #[error("header name contains invalid byte 0x{byte:02x}")]
    InvalidCharacter { byte: u8 },

    #[error("header name is empty")]
    EmptyName,

    #[error("header value is not valid utf-8")]
    NonUtf8Value,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("request start-line is malformed: {reason}")]
    MalformedRequestLine { reason: &'static str },

    #[error("invalid header: {source}")]
    InvalidHeader {
        #[from]
        source: HeaderError,
    },

    #[error("invalid content-length header: {value:?}")]
    InvalidContentLength { value: String },

    #[error("body exceeds declared content-length, received {received}, expected {expected}")]
    BodyOverflow { expected: u64, received: usize },

    #[error("body shorter than declared content-length, received {received}, expected {expected}")]
    BodyUnderflow { expected: u64, received: usize },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("declared body size {declared} exceeds the limit {max_size}")]
    TooLargeBody { declared: u64, max_size: usize },

    #[error("connection closed before any request was received")]
    ConnectionClosed,

    #[error("no complete request within {0:?}")]
    Timeout(Duration),

    #[error("request reading was cancelled")]
    Cancelled,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_request_line(reason: &'static str) -> Self {
        Self::MalformedRequestLine { reason }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_large_body(declared: u64, max_size: usize) -> Self {
        Self::TooLargeBody { declared, max_size }
    }

    pub fn invalid_content_length<S: ToString>(value: S) -> Self {
        Self::InvalidContentLength { value: value.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("wrong state for writer, should be {expected:?} but is {actual:?}")]
    WrongState { expected: WriterState, actual: WriterState },

    #[error("unsupported status code {0}")]
    UnsupportedStatus(StatusCode),

    #[error("header field {name:?} can't be written, invalid name or line break in value")]
    InvalidField { name: String },

    #[error("trailers written but no trailer header was declared")]
    TrailerNotDeclared,

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn wrong_state(expected: WriterState, actual: WriterState) -> Self {
        Self::WrongState { expected, actual }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }
}
