//! HTTP connection handling module
//!
//! This module drives one accepted connection from raw bytes to a written
//! response.
//!
//! # Components
//!
//! - [`HttpConnection`]: reads a request, hands it to a
//!   [`Handler`](crate::handler::Handler) and writes the fallback error
//!   responses
//! - [`ResponseWriter`]: the staged response writer handlers write through

mod http_connection;
mod response_writer;

pub use http_connection::HttpConnection;
pub use response_writer::ResponseWriter;
