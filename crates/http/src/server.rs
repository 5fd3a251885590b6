//! TCP server that runs one [`HttpConnection`] per accepted socket.
//!
//! # Example
//!
//! ```no_run
//! # use httpfromtcp::handler::Handler;
//! # async fn run<H: Handler + 'static>(handler: H) -> Result<(), httpfromtcp::server::ServerError> {
//! use httpfromtcp::server::Server;
//! use std::time::Duration;
//!
//! let handle = Server::builder()
//!     .bind("127.0.0.1:42069")
//!     .read_timeout(Duration::from_secs(5))
//!     .build()?
//!     .start(handler)
//!     .await?;
//!
//! tokio::signal::ctrl_c().await.ok();
//! handle.close().await;
//! # Ok(())
//! # }
//! ```

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::select;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use crate::codec::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEAD_BYTES, RequestDecoder};
use crate::connection::HttpConnection;
use crate::handler::Handler;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("address must be set")]
    MissingAddress,

    #[error("invalid address: {0}")]
    InvalidAddress(#[source] io::Error),

    #[error("bind server error: {0}")]
    Bind(#[source] io::Error),
}

#[derive(Debug)]
pub struct ServerBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    read_timeout: Option<Duration>,
    max_head_bytes: usize,
    max_body_bytes: usize,
}

impl ServerBuilder {
    fn new() -> Self {
        Self {
            address: None,
            read_timeout: None,
            max_head_bytes: DEFAULT_MAX_HEAD_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// The address to listen on; resolution errors surface from [`build`](Self::build).
    pub fn bind<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    /// How long a connection may take to deliver its request. Unbounded by default.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Upper bound on the request line plus headers, in bytes.
    pub fn max_head_bytes(mut self, max_head_bytes: usize) -> Self {
        self.max_head_bytes = max_head_bytes;
        self
    }

    /// Upper bound on the `content-length` a request may declare.
    pub fn max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn build(self) -> Result<Server, ServerError> {
        let address = self.address.ok_or(ServerError::MissingAddress)?.map_err(ServerError::InvalidAddress)?;
        Ok(Server {
            address,
            read_timeout: self.read_timeout,
            max_head_bytes: self.max_head_bytes,
            max_body_bytes: self.max_body_bytes,
        })
    }
}

#[derive(Debug)]
pub struct Server {
    address: Vec<SocketAddr>,
    read_timeout: Option<Duration>,
    max_head_bytes: usize,
    max_body_bytes: usize,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Binds the listener and starts accepting connections in the background.
    pub async fn start<H>(self, handler: H) -> Result<ServerHandle, ServerError>
    where
        H: Handler + 'static,
    {
        let tcp_listener = TcpListener::bind(self.address.as_slice()).await.map_err(ServerError::Bind)?;
        let local_addr = tcp_listener.local_addr().map_err(ServerError::Bind)?;
        info!(%local_addr, "start listening");

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(self.serve(tcp_listener, Arc::new(handler), shutdown.clone()));

        Ok(ServerHandle { local_addr, shutdown, task })
    }

    async fn serve<H>(self, tcp_listener: TcpListener, handler: Arc<H>, shutdown: CancellationToken)
    where
        H: Handler + 'static,
    {
        let connections = TaskTracker::new();

        loop {
            let accepted = select! {
                biased;
                _ = shutdown.cancelled() => break,
                accepted = tcp_listener.accept() => accepted,
            };

            let (tcp_stream, remote_addr) = match accepted {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let handler = Arc::clone(&handler);
            let decoder = RequestDecoder::with_limits(self.max_head_bytes, self.max_body_bytes);
            let connection_shutdown = shutdown.child_token();
            let read_timeout = self.read_timeout;

            connections.spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_decoder(reader, writer, decoder)
                    .read_timeout(read_timeout)
                    .shutdown_token(connection_shutdown);

                match connection.process(handler).await {
                    Ok(()) => info!(%remote_addr, "finished process, connection shutdown"),
                    Err(e) => error!(%remote_addr, cause = %e, "service has error, connection shutdown"),
                }
            });
        }

        connections.close();
        info!(in_flight = connections.len(), "stop listening, waiting for connections");
        connections.wait().await;
        info!("all connections finished");
    }
}

/// A running server. Dropping the handle leaves the server running.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The bound address, useful after binding port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// A token that stops the server, and every idle connection, when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stops accepting connections and waits until every connection task has
    /// finished. Idle connections are dropped, in-flight handlers run to the end.
    pub async fn close(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            error!(cause = %e, "server task ended abnormally");
        }
    }
}
