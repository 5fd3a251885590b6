//! Core HTTP protocol types.
//!
//! This module holds the values that flow between the codec, the connection
//! driver and user handlers.
//!
//! # Architecture
//!
//! - **Headers** (`headers`): the case-insensitive [`Headers`] collection and
//!   its incremental line parser
//! - **Request Processing** (`request`): [`Request`] and [`RequestLine`],
//!   produced by the request decoder
//! - **Response Processing** (`response`): [`WriterState`] and the supported
//!   status codes
//! - **Message Handling** (`message`): [`PayloadItem`] for chunked output
//! - **Error Handling** (`error`):
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: Request parsing errors
//!   - [`HeaderError`]: Rejected header lines
//!   - [`SendError`]: Response writing errors

mod headers;
pub use headers::Headers;
pub(crate) use headers::is_name_byte;

mod message;
pub use message::PayloadItem;

mod request;
pub use request::Request;
pub use request::RequestLine;

mod response;
pub use response::WriterState;
pub use response::reason_phrase;

mod error;
pub use error::HeaderError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
