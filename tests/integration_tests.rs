//! Integration tests for the watch-party server
//!
//! Each test stands up a real server on an ephemeral port and drives it with
//! WebSocket clients, so matchmaking is exercised end to end.

use futures_util::{SinkExt, StreamExt};
use server::config::Config;
use server::network::Server;
use shared::{decode_server_message, encode, ClientMessage, ServerMessage};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE: Duration = Duration::from_millis(200);

static PAGE_DIRS: AtomicUsize = AtomicUsize::new(0);

fn pages_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "watch-party-it-{}-{}",
        std::process::id(),
        PAGE_DIRS.fetch_add(1, Ordering::SeqCst)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>index</h1>").unwrap();
    std::fs::write(dir.join("theinbetween.html"), "<h1>in between</h1>").unwrap();
    dir
}

async fn start_server(catalog_size: u32) -> SocketAddr {
    let config = Config::new("127.0.0.1", 0, catalog_size, pages_dir()).unwrap();
    start_with(config).await
}

async fn start_with(config: Config) -> SocketAddr {
    let server = Server::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

async fn connect(addr: SocketAddr) -> Ws {
    let (ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
    ws
}

async fn send(ws: &mut Ws, message: &ClientMessage) {
    ws.send(Message::Text(encode(message))).await.unwrap();
}

async fn join(ws: &mut Ws, ignore_video_id: Option<u32>) {
    send(ws, &ClientMessage::JoinRoom { ignore_video_id }).await;
}

async fn recv(ws: &mut Ws) -> ServerMessage {
    loop {
        let frame = timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for server message")
            .expect("connection closed")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return decode_server_message(&text).unwrap();
        }
    }
}

async fn recv_video(ws: &mut Ws) -> u32 {
    match recv(ws).await {
        ServerMessage::VideoId { id } => id,
        other => panic!("Expected VIDEO_ID, got {:?}", other),
    }
}

/// Waits until the server has torn the connection down
async fn wait_closed(ws: &mut Ws) {
    let drained = timeout(RECV_TIMEOUT, async {
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;
    assert!(drained.is_ok(), "server never closed the connection");
}

async fn assert_silent(ws: &mut Ws) {
    if let Ok(frame) = timeout(SILENCE, ws.next()).await {
        panic!("Expected no message, got {:?}", frame);
    }
}

/// MATCHMAKING SCENARIOS
mod matchmaking_tests {
    use super::*;

    /// A lone client learns its video but is not told to play
    #[tokio::test]
    async fn lone_client_waits() {
        let addr = start_server(4).await;
        let mut a = connect(addr).await;

        join(&mut a, None).await;

        let video = recv_video(&mut a).await;
        assert!((1..=4).contains(&video));
        assert_silent(&mut a).await;
    }

    /// The second client shares the first client's room and both start playing
    #[tokio::test]
    async fn second_client_pairs_and_plays() {
        let addr = start_server(4).await;
        let mut a = connect(addr).await;
        join(&mut a, None).await;
        let video = recv_video(&mut a).await;

        let mut b = connect(addr).await;
        join(&mut b, None).await;

        assert_eq!(recv_video(&mut b).await, video);
        assert_eq!(recv(&mut b).await, ServerMessage::Play);
        assert_eq!(recv(&mut a).await, ServerMessage::Play);
    }

    /// Partner disconnect stops playback, the room survives, and it is
    /// deleted once the last occupant leaves
    #[tokio::test]
    async fn disconnects_stop_then_prune() {
        let addr = start_server(4).await;
        let mut a = connect(addr).await;
        join(&mut a, None).await;
        let video = recv_video(&mut a).await;
        let mut b = connect(addr).await;
        join(&mut b, None).await;
        recv_video(&mut b).await;
        recv(&mut b).await;
        assert_eq!(recv(&mut a).await, ServerMessage::Play);

        b.close(None).await.unwrap();
        assert_eq!(recv(&mut a).await, ServerMessage::Stop);

        // A is still waiting in its room, so a newcomer lands with A.
        let mut c = connect(addr).await;
        join(&mut c, None).await;
        assert_eq!(recv_video(&mut c).await, video);
        assert_eq!(recv(&mut c).await, ServerMessage::Play);
        assert_eq!(recv(&mut a).await, ServerMessage::Play);

        c.close(None).await.unwrap();
        assert_eq!(recv(&mut a).await, ServerMessage::Stop);
        a.close(None).await.unwrap();
        wait_closed(&mut a).await;

        // With A gone the room is deleted and a newcomer waits alone.
        let mut d = connect(addr).await;
        join(&mut d, None).await;
        recv_video(&mut d).await;
        assert_silent(&mut d).await;
    }

    /// New rooms honor ignoreVideoId
    #[tokio::test]
    async fn ignore_hint_avoids_video() {
        let addr = start_server(4).await;
        let mut a = connect(addr).await;

        for _ in 0..30 {
            join(&mut a, Some(2)).await;
            let video = recv_video(&mut a).await;
            assert!([1, 3, 4].contains(&video), "got video {}", video);
            send(&mut a, &ClientMessage::LeaveRoom).await;
        }
    }

    /// A hint no catalog can contain still places the client
    #[tokio::test]
    async fn unusable_hint_still_joins() {
        let addr = start_server(4).await;
        let mut a = connect(addr).await;

        a.send(Message::Text(
            r#"{"type":"joinRoom","ignoreVideoId":-1}"#.to_string(),
        ))
        .await
        .unwrap();

        let video = recv_video(&mut a).await;
        assert!((1..=4).contains(&video));
    }

    /// Leaving when in no room changes nothing
    #[tokio::test]
    async fn leave_without_room_is_noop() {
        let addr = start_server(4).await;
        let mut a = connect(addr).await;
        send(&mut a, &ClientMessage::LeaveRoom).await;
        send(&mut a, &ClientMessage::LeaveRoom).await;
        assert_silent(&mut a).await;

        join(&mut a, None).await;
        recv_video(&mut a).await;
        assert_silent(&mut a).await;
    }

    /// A malformed frame is dropped without closing the connection
    #[tokio::test]
    async fn malformed_frame_is_ignored() {
        let addr = start_server(4).await;
        let mut a = connect(addr).await;

        a.send(Message::Text("{\"type\":".to_string())).await.unwrap();
        a.send(Message::Text("{\"type\":\"dance\"}".to_string()))
            .await
            .unwrap();
        assert_silent(&mut a).await;

        join(&mut a, None).await;
        recv_video(&mut a).await;
    }
}

/// CONCURRENCY TESTS
mod concurrency_tests {
    use super::*;

    /// Clients joining at the same time are paired two by two
    #[tokio::test]
    async fn concurrent_joins_pair_up() {
        let addr = start_server(4).await;
        let clients = 10;

        let mut handles = Vec::new();
        for _ in 0..clients {
            handles.push(tokio::spawn(async move {
                let mut ws = connect(addr).await;
                join(&mut ws, None).await;
                let video = recv_video(&mut ws).await;
                assert_eq!(recv(&mut ws).await, ServerMessage::Play);
                (ws, video)
            }));
        }

        let mut sockets = Vec::new();
        for handle in handles {
            sockets.push(handle.await.unwrap());
        }

        // Every client got exactly one PLAY, nobody was placed in a third slot.
        for (ws, _) in sockets.iter_mut() {
            assert_silent(ws).await;
        }
    }
}

/// STATIC PAGE TESTS
mod page_tests {
    use super::*;

    async fn http_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            path, addr
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        timeout(RECV_TIMEOUT, stream.read_to_string(&mut response))
            .await
            .expect("timed out reading page")
            .unwrap();
        response
    }

    #[tokio::test]
    async fn serves_index_and_in_between_pages() {
        let addr = start_server(4).await;

        let index = http_get(addr, "/").await;
        assert!(index.starts_with("HTTP/1.1 200 OK"));
        assert!(index.ends_with("<h1>index</h1>"));

        let other = http_get(addr, "/some/where").await;
        assert!(other.ends_with("<h1>index</h1>"));

        let between = http_get(addr, "/theinbetween").await;
        assert!(between.starts_with("HTTP/1.1 200 OK"));
        assert!(between.ends_with("<h1>in between</h1>"));

        let between = http_get(addr, "/theinbetween/").await;
        assert!(between.ends_with("<h1>in between</h1>"));
    }

    /// A connection that never sends a request is closed by the server
    #[tokio::test]
    async fn silent_connection_is_closed() {
        let config = Config::new("127.0.0.1", 0, 4, pages_dir())
            .unwrap()
            .with_head_timeout(Duration::from_millis(300));
        let addr = start_with(config).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut buffer = [0u8; 256];
        let read = timeout(RECV_TIMEOUT, stream.read(&mut buffer))
            .await
            .expect("server kept the silent connection open");

        // Either an orderly close or a reset, but never data.
        assert!(matches!(read, Ok(0) | Err(_)), "got {:?}", read);
    }
}
