//! Request handler trait.
//!
//! A [`Handler`] receives the parsed [`Request`] together with the connection's
//! [`ResponseWriter`] and writes its response directly, stage by stage.

use std::error::Error;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::connection::ResponseWriter;
use crate::protocol::Request;

#[async_trait]
pub trait Handler: Send + Sync {
    type Error: Into<Box<dyn Error + Send + Sync>> + Send;

    /// Handles one request.
    ///
    /// Returning an error before anything was written makes the connection
    /// answer `500 Internal Server Error` on the handler's behalf.
    async fn call<W>(&self, request: Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error>
    where
        W: AsyncWrite + Unpin + Send;
}
