use async_trait::async_trait;
use http::StatusCode;
use httpfromtcp::connection::ResponseWriter;
use httpfromtcp::handler::Handler;
use httpfromtcp::protocol::{Headers, Request, SendError};
use httpfromtcp::server::Server;
use tokio::io::AsyncWrite;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

const PORT: u16 = 42069;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let server = match Server::builder().bind(("127.0.0.1", PORT)).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "invalid server config");
            return;
        }
    };

    let handle = match server.start(PageHandler).await {
        Ok(handle) => handle,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };
    info!(addr = %handle.local_addr(), "server started");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(cause = %e, "can't listen for ctrl-c");
    }
    handle.close().await;
    info!("server gracefully stopped");
}

struct PageHandler;

#[async_trait]
impl Handler for PageHandler {
    type Error = SendError;

    async fn call<W>(&self, request: Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if let Some(count) = request.target().strip_prefix("/chunked/") {
            return match count.parse::<usize>() {
                Ok(count) => write_chunked(writer, count).await,
                Err(_e) => write_page(writer, StatusCode::BAD_REQUEST, "Bad Request", "Chunk count must be a number").await,
            };
        }

        match request.target() {
            "/yourproblem" => {
                write_page(writer, StatusCode::BAD_REQUEST, "Bad Request", "Your request honestly kinda sucked.").await
            }
            "/myproblem" => {
                write_page(
                    writer,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Okay, you know what? This one is on me.",
                )
                .await
            }
            _ => write_page(writer, StatusCode::OK, "Success!", "Your request was an absolute banger.").await,
        }
    }
}

async fn write_page<W>(writer: &mut ResponseWriter<W>, status: StatusCode, title: &str, message: &str) -> Result<(), SendError>
where
    W: AsyncWrite + Unpin + Send,
{
    let page = format!(
        "<html>\n  <head>\n    <title>{} {title}</title>\n  </head>\n  <body>\n    <h1>{title}</h1>\n    <p>{message}</p>\n  </body>\n</html>\n",
        status.as_u16()
    );

    let mut headers = Headers::default_response(page.len());
    headers.set("content-type", mime::TEXT_HTML.as_ref());

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(page.as_bytes()).await?;
    Ok(())
}

async fn write_chunked<W>(writer: &mut ResponseWriter<W>, count: usize) -> Result<(), SendError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut headers = Headers::default_response(0);
    headers.unset("content-length");
    headers.set("transfer-encoding", "chunked");
    headers.set("trailer", "X-Content-Length");

    writer.write_status_line(StatusCode::OK).await?;
    writer.write_headers(&headers).await?;

    let mut content_length = 0;
    for i in 0..count {
        let line = format!("chunk {i} of {count}\n");
        writer.write_chunked_body(line.as_bytes()).await?;
        content_length += line.len();
    }
    writer.write_chunked_body_done().await?;

    headers.set("x-content-length", content_length.to_string());
    writer.write_trailers(&headers).await
}
