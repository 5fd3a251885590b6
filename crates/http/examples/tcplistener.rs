use httpfromtcp::codec::parse_from_stream;
use tokio::net::TcpListener;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!(port = 42069, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:42069").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };
        info!(%remote_addr, "connection has been accepted");

        let request = match parse_from_stream(tcp_stream).await {
            Ok(request) => request,
            Err(e) => {
                warn!(%remote_addr, cause = %e, "can't parse request");
                continue;
            }
        };

        println!("Request line:");
        println!("- Method: {}", request.method());
        println!("- Target: {}", request.target());
        println!("- Version: {:?}", request.version());
        println!("Headers:");
        for (name, value) in request.headers().iter() {
            println!("- {name}: {value}");
        }
        println!("Body:");
        println!("{}", String::from_utf8_lossy(request.body()));

        info!(%remote_addr, "connection has been closed");
    }
}
