use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::select;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::codec::{INIT_BUFFER_SIZE, RequestDecoder, read_request};
use crate::connection::ResponseWriter;
use crate::handler::Handler;
use crate::protocol::{Headers, HttpError, ParseError, Request, SendError, WriterState};

/// A single HTTP connection: one request in, one response out.
///
/// `HttpConnection` handles the full lifecycle of the connection:
/// - Reading and decoding the request, bounded by an optional read timeout
///   and interrupted by the shutdown token
/// - Handing the request and the [`ResponseWriter`] to the handler
/// - Answering `400` for unparsable input and `500` for a failed handler
/// - Shutting the write half down
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    writer: ResponseWriter<W>,
    read_timeout: Option<Duration>,
    shutdown: CancellationToken,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_decoder(reader, writer, RequestDecoder::new())
    }

    pub fn with_decoder(reader: R, writer: W, decoder: RequestDecoder) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, decoder, INIT_BUFFER_SIZE),
            writer: ResponseWriter::new(writer),
            read_timeout: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Gives up on a request that has not fully arrived within `timeout`.
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Stops waiting for a request once `token` is cancelled.
    pub fn shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        let request = match self.next_request().await {
            Ok(request) => request,

            Err(ParseError::ConnectionClosed) => {
                info!("connection closed before any request");
                return Ok(());
            }

            Err(ParseError::Cancelled) => {
                info!("server shutting down, dropping idle connection");
                self.writer.shutdown().await?;
                return Ok(());
            }

            Err(e @ ParseError::Io { .. }) => {
                error!(cause = %e, "can't read request");
                return Err(e.into());
            }

            Err(e) => {
                warn!(cause = %e, "can't parse request, responding bad request");
                self.send_error(StatusCode::BAD_REQUEST).await?;
                self.writer.shutdown().await?;
                return Err(e.into());
            }
        };

        info!(method = %request.method(), target = request.target(), "received request");

        let result = handler.call(request, &mut self.writer).await.map_err(HttpError::handler);
        if let Err(e) = result {
            error!(cause = %e, "handle request error");

            // a response that has already started can't be replaced
            if self.writer.state() != WriterState::StatusLine {
                return Err(e);
            }
            self.send_error(StatusCode::INTERNAL_SERVER_ERROR).await?;
        }

        self.writer.shutdown().await?;
        Ok(())
    }

    async fn next_request(&mut self) -> Result<Request, ParseError> {
        let read_timeout = self.read_timeout;
        let framed_read = &mut self.framed_read;

        let read = async move {
            match read_timeout {
                Some(timeout) => tokio::time::timeout(timeout, read_request(framed_read))
                    .await
                    .map_err(|_elapsed| ParseError::Timeout(timeout))?,
                None => read_request(framed_read).await,
            }
        };

        select! {
            biased;
            _ = self.shutdown.cancelled() => Err(ParseError::Cancelled),
            result = read => result,
        }
    }

    async fn send_error(&mut self, status: StatusCode) -> Result<(), SendError> {
        self.writer.write_status_line(status).await?;
        self.writer.write_headers(&Headers::default_response(0)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mock::PieceReader;
    use async_trait::async_trait;
    use indoc::indoc;
    use std::io;
    use tokio::io::DuplexStream;

    #[derive(Debug)]
    struct Echo;

    #[async_trait]
    impl Handler for Echo {
        type Error = SendError;

        async fn call<W>(&self, request: Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error>
        where
            W: AsyncWrite + Unpin + Send,
        {
            let body = format!("{} {}", request.method(), request.target());
            writer.write_status_line(StatusCode::OK).await?;
            writer.write_headers(&Headers::default_response(body.len())).await?;
            writer.write_body(body.as_bytes()).await?;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Failing {
        after_status_line: bool,
    }

    #[async_trait]
    impl Handler for Failing {
        type Error = io::Error;

        async fn call<W>(&self, _request: Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error>
        where
            W: AsyncWrite + Unpin + Send,
        {
            if self.after_status_line {
                writer.write_status_line(StatusCode::OK).await.map_err(io::Error::other)?;
            }
            Err(io::Error::other("handler gave up"))
        }
    }

    const REQUEST: &str = indoc! {"
        GET /coffee HTTP/1.1\r
        Host: localhost:42069\r
        \r
    "};

    async fn run<H: Handler>(input: &[u8], handler: H) -> (Result<(), HttpError>, String) {
        let mut output = Vec::new();
        let connection = HttpConnection::new(PieceReader::new(input, 7), &mut output);
        let result = connection.process(Arc::new(handler)).await;

        (result, String::from_utf8(output).unwrap())
    }

    fn assert_send<T: Send>(_: &T) {}

    fn process_is_send<H: Handler>(connection: HttpConnection<DuplexStream, DuplexStream>, handler: Arc<H>) {
        assert_send(&connection.process(handler));
    }

    #[test]
    fn process_future_can_be_spawned() {
        let (client, server) = tokio::io::duplex(64);
        process_is_send(HttpConnection::new(client, server), Arc::new(Echo));
    }

    #[tokio::test]
    async fn handler_writes_response() {
        let (result, output) = run(REQUEST.as_bytes(), Echo).await;

        assert!(result.is_ok());
        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(output.contains("content-length: 11\r\n"));
        assert!(output.ends_with("\r\n\r\nGET /coffee"));
    }

    #[tokio::test]
    async fn malformed_request_gets_bad_request() {
        let (result, output) = run(b"/coffee HTTP/1.1\r\n\r\n", Echo).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::MalformedRequestLine { .. } })));
        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(output.contains("content-length: 0\r\n"));
        assert!(output.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn empty_connection_is_not_an_error() {
        let (result, output) = run(b"", Echo).await;

        assert!(result.is_ok());
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn failed_handler_gets_internal_server_error() {
        let (result, output) = run(REQUEST.as_bytes(), Failing { after_status_line: false }).await;

        assert!(result.is_ok());
        assert!(output.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(output.contains("connection: close\r\n"));
    }

    #[tokio::test]
    async fn handler_failing_mid_response_is_reported() {
        let (result, output) = run(REQUEST.as_bytes(), Failing { after_status_line: true }).await;

        assert!(matches!(result, Err(HttpError::HandlerError { .. })));
        assert_eq!(output, "HTTP/1.1 200 OK\r\n");
    }

    #[tokio::test]
    async fn stalled_request_times_out() {
        let (_client, server) = tokio::io::duplex(64);
        let mut output = Vec::new();

        let connection = HttpConnection::new(server, &mut output).read_timeout(Some(Duration::from_millis(20)));
        let result = connection.process(Arc::new(Echo)).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::Timeout(_) })));
        assert!(output.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn cancelled_connection_closes_quietly() {
        let (_client, server) = tokio::io::duplex(64);
        let token = CancellationToken::new();
        let mut output = Vec::new();

        let connection = HttpConnection::new(server, &mut output).shutdown_token(token.clone());
        token.cancel();
        let result = connection.process(Arc::new(Echo)).await;

        assert!(result.is_ok());
        assert!(output.is_empty());
    }
}
