// Real server + websocket client for end-to-end connection tests

use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpServer};
use futures_util::{SinkExt, StreamExt};
use quiz_backend::{routes, AppState, RequestTrace};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type TestError = Box<dyn std::error::Error>;

/// Bind the full route table on a random local port.
pub async fn start_test_server(
    state: AppState,
) -> Result<(ServerHandle, SocketAddr, tokio::task::JoinHandle<std::io::Result<()>>), TestError> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(RequestTrace)
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    let join = tokio::spawn(server);
    Ok((handle, addr, join))
}

pub async fn wait_for_connections(
    state: &AppState,
    session_id: i64,
    expected: usize,
    timeout: Duration,
) -> Result<(), TestError> {
    let start = tokio::time::Instant::now();
    loop {
        let current = state.registry().connection_count(session_id);
        if current == expected {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(format!(
                "timeout waiting for {expected} connections on session {session_id} (got {current})"
            )
            .into());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub struct WebSocketClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketClient {
    pub async fn connect(url: &str) -> Result<Self, TestError> {
        let (stream, _) = connect_async(url).await?;
        Ok(Self { stream })
    }

    pub async fn send_text(&mut self, text: &str) -> Result<(), TestError> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Next text frame as JSON; control frames are skipped.
    pub async fn recv_json(&mut self, timeout: Duration) -> Result<Value, TestError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let frame = tokio::time::timeout_at(deadline, self.stream.next())
                .await
                .map_err(|_| "timeout waiting for message")?
                .ok_or("connection closed")??;
            match frame {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(_) => return Err("connection closed".into()),
                _ => continue,
            }
        }
    }

    /// Read until a message with `type == kind` arrives.
    pub async fn recv_kind(&mut self, kind: &str, timeout: Duration) -> Result<Value, TestError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let msg = self.recv_json(remaining).await?;
            if msg["type"] == kind {
                return Ok(msg);
            }
        }
    }

    pub async fn close(&mut self) -> Result<(), TestError> {
        self.stream.close(None).await?;
        Ok(())
    }
}
