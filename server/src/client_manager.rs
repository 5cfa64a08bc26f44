//! Connected client tracking for the matchmaking server
//!
//! This module holds the server-side record of every open connection:
//! - The identifier assigned on connect
//! - The outbound handle used to push messages to that connection
//! - The room the client currently occupies, if any
//!
//! The client manager is the single source of truth for "which room is this
//! client in". The coordinator consults it to resolve leave requests that do
//! not name a room, such as the implicit leave on disconnect.

use crate::ids::{ClientId, RoomId};
use log::{debug, info};
use shared::ServerMessage;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Outbound half of a client connection.
///
/// Sending never blocks; a writer task drains the channel into the socket.
pub type ClientHandle = mpsc::UnboundedSender<ServerMessage>;

/// Represents a connected client and their room association
#[derive(Debug)]
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: ClientId,
    /// Channel feeding this client's connection writer
    pub handle: ClientHandle,
    /// Room the client currently occupies
    pub room: Option<RoomId>,
}

impl Client {
    /// Creates an unassigned client
    pub fn new(id: ClientId, handle: ClientHandle) -> Self {
        Self {
            id,
            handle,
            room: None,
        }
    }

    /// Pushes a message to the client without waiting for delivery.
    ///
    /// Returns false when the connection writer has already gone away.
    pub fn push(&self, message: ServerMessage) -> bool {
        match self.handle.send(message) {
            Ok(()) => true,
            Err(e) => {
                debug!("Dropping {:?} for closed client {}", e.0, self.id);
                false
            }
        }
    }
}

/// Manages all connected clients
#[derive(Debug, Default)]
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<ClientId, Client>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Registers a client, replacing any previous entry with the same ID
    pub fn add(&mut self, client: Client) {
        info!("Client {} connected", client.id);
        self.clients.insert(client.id.clone(), client);
    }

    /// Removes a client from the server
    ///
    /// Returns the removed record, or None if they were already gone.
    pub fn remove(&mut self, client_id: &ClientId) -> Option<Client> {
        let removed = self.clients.remove(client_id);
        if removed.is_some() {
            info!("Client {} disconnected", client_id);
        }
        removed
    }

    pub fn find_by_id(&self, client_id: &ClientId) -> Option<&Client> {
        self.clients.get(client_id)
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.clients.contains_key(client_id)
    }

    /// Records which room a client is in
    ///
    /// Returns false if the client ID is unknown.
    pub fn set_room(&mut self, client_id: &ClientId, room: Option<RoomId>) -> bool {
        if let Some(client) = self.clients.get_mut(client_id) {
            client.room = room;
            true
        } else {
            false
        }
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
