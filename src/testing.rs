//! In-process WebSocket server used by the async tests.

use crate::client::NotifyClientOptions;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout, timeout_at};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Connected { id: usize, uri: String },
    Text { id: usize, text: String },
    Closed { id: usize },
}

pub struct MockServer {
    addr: SocketAddr,
    events: mpsc::UnboundedReceiver<ServerEvent>,
    peers: Arc<Mutex<Vec<mpsc::UnboundedSender<Message>>>>,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (events_tx, events) = mpsc::unbounded_channel();
        let peers = Arc::new(Mutex::new(Vec::new()));

        let peers_for_accept = Arc::clone(&peers);
        tokio::spawn(async move {
            let mut next_id = 0;
            while let Ok((stream, _)) = listener.accept().await {
                let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
                peers_for_accept.lock().unwrap().push(outbound_tx);
                tokio::spawn(serve_peer(next_id, stream, events_tx.clone(), outbound_rx));
                next_id += 1;
            }
        });

        Self {
            addr,
            events,
            peers,
        }
    }

    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    /// Number of TCP connections accepted so far
    pub fn connection_count(&self) -> usize {
        self.peers.lock().unwrap().len()
    }

    pub async fn next_event(&mut self) -> ServerEvent {
        timeout(EVENT_TIMEOUT, self.events.recv())
            .await
            .expect("timed out waiting for server event")
            .expect("server event channel closed")
    }

    /// Next event that is not a keep-alive ping
    pub async fn next_non_ping(&mut self) -> ServerEvent {
        loop {
            match self.next_event().await {
                ServerEvent::Text { text, .. } if text == "ping" => continue,
                event => return event,
            }
        }
    }

    /// Next event arriving before `deadline`, if any
    pub async fn next_event_before(&mut self, deadline: Instant) -> Option<ServerEvent> {
        timeout_at(deadline, self.events.recv()).await.ok().flatten()
    }

    pub async fn expect_connected(&mut self) -> (usize, String) {
        match self.next_non_ping().await {
            ServerEvent::Connected { id, uri } => (id, uri),
            other => panic!("expected connection, got {:?}", other),
        }
    }

    pub async fn expect_closed(&mut self, expected: usize) {
        match self.next_non_ping().await {
            ServerEvent::Closed { id } if id == expected => {}
            other => panic!("expected close of connection {}, got {:?}", expected, other),
        }
    }

    pub async fn expect_no_event(&mut self, wait: Duration) {
        if let Ok(Some(event)) = timeout(wait, self.events.recv()).await {
            panic!("unexpected server event: {:?}", event);
        }
    }

    pub fn send_text(&self, id: usize, text: &str) {
        self.send(id, Message::text(text.to_owned()));
    }

    pub fn close_peer(&self, id: usize, code: u16, reason: &str) {
        self.send(
            id,
            Message::Close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: reason.to_owned().into(),
            })),
        );
    }

    fn send(&self, id: usize, msg: Message) {
        let peers = self.peers.lock().unwrap();
        peers[id].send(msg).expect("peer connection gone");
    }
}

async fn serve_peer(
    id: usize,
    stream: TcpStream,
    events: mpsc::UnboundedSender<ServerEvent>,
    mut outbound: mpsc::UnboundedReceiver<Message>,
) {
    let mut uri = String::new();
    let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        uri = req.uri().to_string();
        Ok(resp)
    };
    let Ok(ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
        return;
    };
    let _ = events.send(ServerEvent::Connected { id, uri });

    let (mut write, mut read) = ws.split();
    loop {
        tokio::select! {
            outgoing = outbound.recv() => match outgoing {
                Some(msg) => {
                    if write.send(msg).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(ServerEvent::Text {
                        id,
                        text: text.as_str().to_owned(),
                    });
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    let _ = events.send(ServerEvent::Closed { id });
}

/// Plain `ws://` options pointing at the mock server
pub fn test_options(server: &MockServer) -> NotifyClientOptions {
    NotifyClientOptions {
        api_base_url: server.host(),
        secure: false,
        connect_timeout: Some(2000),
        ..Default::default()
    }
}

/// Handler forwarding every payload into a channel
pub fn collecting_handler() -> (
    impl Fn(String) + Send + Sync + 'static,
    mpsc::UnboundedReceiver<String>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler = move |payload: String| {
        let _ = tx.send(payload);
    };
    (handler, rx)
}

/// `host:port` with nothing listening on it
pub async fn unused_port_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}
