//! HTTP/1.1 straight from a TCP stream
//!
//! This crate parses HTTP/1.1 requests incrementally from any asynchronous
//! byte stream and writes responses through a staged writer that enforces the
//! order of the wire format. It is built on top of tokio.
//!
//! # Features
//!
//! - Incremental request parsing that gives the same result however the input
//!   is split across reads
//! - Case-insensitive header collection with folding of repeated names
//! - `content-length` bodies, with overflow and underflow detection
//! - Response writer state machine: status line, headers, body
//! - Chunked transfer encoding with trailers
//! - Read timeout and graceful shutdown
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use http::StatusCode;
//! use httpfromtcp::connection::ResponseWriter;
//! use httpfromtcp::handler::Handler;
//! use httpfromtcp::protocol::{Headers, Request, SendError};
//! use httpfromtcp::server::Server;
//! use tokio::io::AsyncWrite;
//! use tracing::{info, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! struct HelloWorld;
//!
//! #[async_trait]
//! impl Handler for HelloWorld {
//!     type Error = SendError;
//!
//!     async fn call<W>(&self, request: Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error>
//!     where
//!         W: AsyncWrite + Unpin + Send,
//!     {
//!         info!(target = request.target(), "request path");
//!
//!         let body = "Hello World!\r\n";
//!         writer.write_status_line(StatusCode::OK).await?;
//!         writer.write_headers(&Headers::default_response(body.len())).await?;
//!         writer.write_body(body.as_bytes()).await?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let server = Server::builder().bind("127.0.0.1:42069").build().expect("valid address");
//!     let handle = server.start(HelloWorld).await.expect("bind server");
//!
//!     tokio::signal::ctrl_c().await.expect("listen for ctrl-c");
//!     handle.close().await;
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`protocol`]: Protocol types: headers, requests, writer states and errors
//! - [`codec`]: Request decoding and response encoding
//! - [`connection`]: The response writer and single connection lifecycle
//! - [`handler`]: Request handler trait
//! - [`server`]: Listener, accept loop and shutdown
//!
//! ## Error Handling
//!
//! The crate uses custom error types that implement `std::error::Error`:
//!
//! - [`protocol::HttpError`]: Top-level error type
//! - [`protocol::ParseError`]: Request parsing errors
//! - [`protocol::HeaderError`]: Rejected header lines
//! - [`protocol::SendError`]: Response writing errors
//! - [`server::ServerError`]: Configuration and bind errors
//!
//! # Limitations
//!
//! - HTTP/1.1 only, other versions are rejected
//! - One request per connection, responses are sent with `connection: close`
//! - Request bodies are framed by `content-length` only
//! - Response status codes 200, 400 and 500 only
//! - Maximum request head size: 8KB by default

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
