//! Shared helpers for relay integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chat_relay::{ChatServer, Message, Registry, ServerConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// How long a client waits for an expected message.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a client waits before concluding nothing was delivered.
pub const SILENCE: Duration = Duration::from_millis(300);

/// Start a relay on an OS-assigned port and return its address and registry.
pub async fn start_server(max_connections: Option<usize>) -> (SocketAddr, Arc<Registry>) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_connections,
        ..ServerConfig::default()
    };
    let server = ChatServer::bind(&config).await.unwrap();
    let addr = server.local_addr().unwrap();
    let registry = server.registry();
    tokio::spawn(server.run());
    (addr, registry)
}

/// A line-oriented protocol peer.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Connect, complete the handshake and wait until registered.
    ///
    /// Registration is confirmed by sending a probe line and reading back
    /// its echo.
    pub async fn join(addr: SocketAddr, name: &str, room: &str) -> Self {
        let mut client = Self::connect(addr).await;
        client.send_line(name).await;
        client.send_line(room).await;
        let probe = format!("{} is here", name);
        client.send_line(&probe).await;
        let echo = client.recv().await.expect("connection closed before echo");
        assert_eq!(echo.author, name);
        assert_eq!(echo.text, probe);
        client
    }

    pub async fn send_line(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    /// Next message, or `None` if the server closed the connection.
    pub async fn recv(&mut self) -> Option<Message> {
        let mut line = String::new();
        let n = tokio::time::timeout(RECV_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for message")
            .unwrap();
        (n > 0).then(|| Message::from_line(&line).unwrap())
    }

    /// Skip messages until one with the given text arrives.
    pub async fn recv_text(&mut self, text: &str) -> Message {
        loop {
            let msg = self.recv().await.expect("connection closed");
            if msg.text == text {
                return msg;
            }
        }
    }

    /// Next message if one arrives within the silence window.
    pub async fn try_recv(&mut self) -> Option<Message> {
        let mut line = String::new();
        match tokio::time::timeout(SILENCE, self.reader.read_line(&mut line)).await {
            Ok(Ok(n)) if n > 0 => Some(Message::from_line(&line).unwrap()),
            _ => None,
        }
    }

    /// Assert that nothing arrives within the silence window.
    pub async fn assert_silent(&mut self) {
        let mut line = String::new();
        let result = tokio::time::timeout(SILENCE, self.reader.read_line(&mut line)).await;
        assert!(result.is_err(), "unexpected delivery: {}", line);
    }
}

/// Poll until the registry reaches the expected size.
pub async fn wait_for_len(registry: &Registry, expected: usize) {
    tokio::time::timeout(RECV_TIMEOUT, async {
        while registry.len().await != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("registry never reached expected size");
}
