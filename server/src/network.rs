//! Server network layer: HTTP pages, WebSocket connections and the event loop
//!
//! Every connection is served by an axum [`Router`]. Requests carrying a
//! WebSocket upgrade become watch clients; anything else gets one of the two
//! static pages.

use crate::client_manager::ClientHandle;
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::ids::ClientId;
use crate::pages::{StaticPages, BETWEEN_PAGE, INDEX_PAGE};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use futures_util::{SinkExt, StreamExt};
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use log::{debug, error, info, warn};
use rand::Rng;
use shared::ServerMessage;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

/// Messages sent from connection tasks to the coordinator loop
#[derive(Debug)]
pub enum Event {
    Connected {
        handle: ClientHandle,
        reply: oneshot::Sender<ClientId>,
    },
    Message {
        client_id: ClientId,
        text: String,
    },
    Disconnected {
        client_id: ClientId,
    },
}

/// Shared by every request handler
#[derive(Clone)]
struct AppState {
    events: mpsc::UnboundedSender<Event>,
    pages: Arc<StaticPages>,
}

/// Listener plus the configuration needed to run the matchmaking loop
pub struct Server {
    listener: TcpListener,
    catalog_size: u32,
    head_timeout: Duration,
    pages: Arc<StaticPages>,
}

impl Server {
    pub async fn bind(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(config.addr).await?;
        info!("Listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            catalog_size: config.catalog_size,
            head_timeout: config.head_timeout,
            pages: Arc::new(StaticPages::new(config.pages_dir)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, feeding every event into one coordinator task
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let coordinator = Coordinator::new(self.catalog_size);
        tokio::spawn(run_coordinator(coordinator, event_rx));

        let app = router(event_tx, self.pages);
        info!(
            "Server started with a catalog of {} videos",
            self.catalog_size
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let app = app.clone().layer(Extension(ConnectInfo(addr)));
                    tokio::spawn(serve_connection(stream, addr, app, self.head_timeout));
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}

/// Routes `/theinbetween` to its page and everything else to [`entry`]
pub fn router(events: mpsc::UnboundedSender<Event>, pages: Arc<StaticPages>) -> Router {
    Router::new()
        .route("/theinbetween", get(between_page))
        .route("/theinbetween/", get(between_page))
        .fallback(entry)
        .with_state(AppState { events, pages })
}

/// Drives one HTTP/1 connection, upgrades included
///
/// A connection that sends no complete request head within `head_timeout`
/// is closed.
async fn serve_connection(
    stream: TcpStream,
    addr: SocketAddr,
    app: Router,
    head_timeout: Duration,
) {
    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(head_timeout);

    let connection = builder
        .serve_connection(TokioIo::new(stream), TowerToHyperService::new(app))
        .with_upgrades();
    if let Err(e) = connection.await {
        debug!("Connection from {} closed: {}", addr, e);
    }
}

/// WebSocket upgrades join the matchmaking pool, plain requests get the index
async fn entry(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    upgrade: Option<WebSocketUpgrade>,
) -> Response {
    match upgrade {
        Some(upgrade) => {
            upgrade.on_upgrade(move |socket| serve_websocket(socket, addr, state.events))
        }
        None => state.pages.serve(INDEX_PAGE).await,
    }
}

async fn between_page(State(state): State<AppState>) -> Response {
    state.pages.serve(BETWEEN_PAGE).await
}

/// Applies events one at a time until every sender is gone
///
/// This is the only place registry state is touched, so a join, leave or
/// disconnect is fully processed, pushes included, before the next begins.
pub async fn run_coordinator<R: Rng>(
    mut coordinator: Coordinator<R>,
    mut events: mpsc::UnboundedReceiver<Event>,
) {
    while let Some(event) = events.recv().await {
        match event {
            Event::Connected { handle, reply } => {
                let client_id = coordinator.connect(handle);
                if reply.send(client_id.clone()).is_err() {
                    // The connection task is already gone.
                    if let Err(e) = coordinator.disconnect(&client_id) {
                        warn!("{}: {}", client_id, e);
                    }
                }
            }
            Event::Message { client_id, text } => {
                coordinator.handle_message(&client_id, &text);
            }
            Event::Disconnected { client_id } => {
                if let Err(e) = coordinator.disconnect(&client_id) {
                    warn!("{}: {}", client_id, e);
                }
            }
        }
    }

    info!("Event queue closed, coordinator stopping");
}

async fn serve_websocket(
    socket: WebSocket,
    addr: SocketAddr,
    events: mpsc::UnboundedSender<Event>,
) {
    let (mut sink, mut source) = socket.split();

    let (handle, mut outbound) = mpsc::unbounded_channel::<ServerMessage>();
    let (reply_tx, reply_rx) = oneshot::channel();
    if events
        .send(Event::Connected {
            handle,
            reply: reply_tx,
        })
        .is_err()
    {
        error!("Coordinator is gone, refusing {}", addr);
        return;
    }
    let client_id = match reply_rx.await {
        Ok(client_id) => client_id,
        Err(_) => return,
    };
    info!("{}: connected from {}", client_id, addr);

    // Ends once the coordinator drops this client's handle.
    let writer_id = client_id.clone();
    tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(shared::encode(&message))).await {
                debug!("{}: failed to send {:?}: {}", writer_id, message, e);
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = source.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let event = Event::Message {
                    client_id: client_id.clone(),
                    text,
                };
                if events.send(event).is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("{}: read error: {}", client_id, e);
                break;
            }
        }
    }

    info!("{}: client disconnected", client_id);
    let _ = events.send(Event::Disconnected { client_id });
}
