//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;
use futures_util::stream::SplitStream;
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use keepalive_guard::config::GuardConfig;
use keepalive_guard::net::connection::ConnectionTracker;
use keepalive_guard::net::{KeepAliveServer, Listener, ServerError};
use keepalive_guard::Shutdown;

pub type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A keep-alive server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub tracker: ConnectionTracker,
    pub task: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }
}

/// Config with short timeouts suitable for tests.
pub fn fast_config(recv_timeout_ms: u64, ping_interval_ms: u64) -> GuardConfig {
    let mut config = GuardConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.keepalive.recv_timeout_ms = recv_timeout_ms;
    config.keepalive.ping_interval_ms = ping_interval_ms;
    config.observability.metrics_enabled = false;
    config
}

/// Start a keep-alive server with `config`.
pub async fn start_server(config: GuardConfig) -> TestServer {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let listener = Listener::from_tcp(tcp, config.listener.max_connections);

    let shutdown = Shutdown::new();
    let server = KeepAliveServer::new(config).unwrap();
    let tracker = server.tracker().clone();
    let token = shutdown.subscribe();
    let task = tokio::spawn(async move { server.run(listener, token).await });

    TestServer {
        addr,
        shutdown,
        tracker,
        task,
    }
}

pub async fn connect(server: &TestServer) -> ClientStream {
    let (stream, _) = tokio_tungstenite::connect_async(server.url()).await.unwrap();
    stream
}

/// How a client observed the end of its connection.
#[derive(Debug)]
pub enum Ending {
    /// A close frame arrived, with its code if present.
    Closed(Option<CloseCode>),
    /// The stream ended or errored without a close frame.
    Dropped,
}

/// Read (answering pings) until the connection ends or `limit` elapses.
/// Returns `None` if the connection is still open at the limit.
pub async fn read_until_end(
    read: &mut SplitStream<ClientStream>,
    limit: Duration,
) -> Option<Ending> {
    let reading = async {
        loop {
            match read.next().await {
                Some(Ok(Message::Close(frame))) => return Ending::Closed(frame.map(|f| f.code)),
                Some(Ok(_)) => continue,
                Some(Err(_)) | None => return Ending::Dropped,
            }
        }
    };
    tokio::time::timeout(limit, reading).await.ok()
}

/// Poll `condition` until it holds or `limit` elapses.
pub async fn eventually<F>(limit: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
