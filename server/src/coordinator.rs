//! Matchmaking coordinator
//!
//! Owns the room and client registries and applies every connect, message and
//! disconnect event to them. A client moves through
//! `Connected -> InRoom(waiting) -> InRoom(paired) -> Connected` any number of
//! times before it disconnects. The coordinator is not thread-safe by itself;
//! the network layer feeds it from a single event queue so each event is fully
//! applied, pushes included, before the next one starts.

use crate::client_manager::{Client, ClientHandle, ClientManager};
use crate::error::CoordinatorError;
use crate::ids::{ClientId, IdGenerator, RoomId};
use crate::room_manager::{Room, RoomManager};
use crate::selector::{pick_content, SelectError};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{decode_client_message, ClientMessage, ContentId, ServerMessage};

/// Owns every room and client and applies requests against them
pub struct Coordinator<R: Rng = StdRng> {
    rooms: RoomManager,
    clients: ClientManager,
    rng: R,
    catalog_size: u32,
}

impl Coordinator<StdRng> {
    /// Builds a coordinator seeded from system entropy.
    pub fn new(catalog_size: u32) -> Self {
        Self::with_rng(catalog_size, StdRng::from_entropy())
    }
}

impl<R: Rng> Coordinator<R> {
    /// Builds a coordinator drawing ids and content from `rng`.
    pub fn with_rng(catalog_size: u32, rng: R) -> Self {
        Self {
            rooms: RoomManager::new(),
            clients: ClientManager::new(),
            rng,
            catalog_size,
        }
    }

    /// Registers a new, unassigned client and returns its id.
    pub fn connect(&mut self, handle: ClientHandle) -> ClientId {
        let client_id = loop {
            let candidate = ClientId::from(IdGenerator::next_id(&mut self.rng));
            if !self.clients.contains(&candidate) {
                break candidate;
            }
        };

        self.clients.add(Client::new(client_id.clone(), handle));
        debug!(
            "{}: connected, {} clients in {} rooms",
            client_id,
            self.clients.len(),
            self.rooms.len()
        );
        client_id
    }

    /// Places the client in the first joinable room, or a fresh one.
    ///
    /// `ignore` only matters when a new room has to be created.
    pub fn join(
        &mut self,
        client_id: &ClientId,
        ignore: Option<ContentId>,
    ) -> Result<RoomId, CoordinatorError> {
        let room_id = match self.rooms.find_joinable() {
            Some(room) => room.id.clone(),
            None => self.fresh_room_id(),
        };
        self.join_room(client_id, room_id, ignore)
    }

    /// Moves the client into `room_id`, creating the room if it does not exist.
    ///
    /// Any room the client already occupies is left first, including
    /// `room_id` itself. Rejoining a room you sit in alone therefore replaces
    /// it with a new room under the same id and a newly picked video.
    pub fn join_room(
        &mut self,
        client_id: &ClientId,
        room_id: RoomId,
        exclude: Option<ContentId>,
    ) -> Result<RoomId, CoordinatorError> {
        debug!(
            "{}: join_room(room={}, exclude={:?})",
            client_id, room_id, exclude
        );
        let previous = self
            .clients
            .find_by_id(client_id)
            .ok_or_else(|| CoordinatorError::UnknownClient(client_id.clone()))?
            .room
            .clone();

        if let Some(room) = self.rooms.find_by_id(&room_id) {
            if room.is_full() && !room.contains(client_id) {
                return Err(CoordinatorError::RoomFull(room_id));
            }
        }

        if let Some(previous) = previous {
            if let Err(e) = self.leave_room(client_id, &previous) {
                warn!("{}: stale room association: {}", client_id, e);
                self.clients.set_room(client_id, None);
            }
        }

        if !self.rooms.contains(&room_id) {
            let content = self.pick_for_new_room(exclude)?;
            info!("{}: new room {}", client_id, room_id);
            self.rooms.create(room_id.clone(), content)?;
        }

        let room = self
            .rooms
            .find_by_id_mut(&room_id)
            .ok_or_else(|| CoordinatorError::UnknownRoom(room_id.clone()))?;
        room.occupants.push(client_id.clone());
        let content = room.content;
        let paired = room.is_full().then(|| room.occupants.clone());

        self.clients.set_room(client_id, Some(room_id.clone()));
        self.push(client_id, ServerMessage::VideoId { id: content });
        info!(
            "{}: joined room {}, video {}",
            client_id, room_id, content
        );

        if let Some(occupants) = paired {
            info!("Room {} is paired, starting playback", room_id);
            for occupant in &occupants {
                self.push(occupant, ServerMessage::Play);
            }
        }

        Ok(room_id)
    }

    /// Takes the client out of whatever room it is in.
    ///
    /// A client that is in no room is left untouched.
    pub fn leave(&mut self, client_id: &ClientId) -> Result<(), CoordinatorError> {
        let current = self
            .clients
            .find_by_id(client_id)
            .ok_or_else(|| CoordinatorError::UnknownClient(client_id.clone()))?
            .room
            .clone();

        match current {
            Some(room_id) => self.leave_room(client_id, &room_id),
            None => {
                debug!("{}: leave requested while in no room", client_id);
                Ok(())
            }
        }
    }

    /// Removes the client from `room_id`, pruning the room once it is empty.
    pub fn leave_room(
        &mut self,
        client_id: &ClientId,
        room_id: &RoomId,
    ) -> Result<(), CoordinatorError> {
        debug!("{}: leave_room(room={})", client_id, room_id);
        let room = self
            .rooms
            .find_by_id_mut(room_id)
            .ok_or_else(|| CoordinatorError::UnknownRoom(room_id.clone()))?;
        let index = room
            .occupants
            .iter()
            .position(|occupant| occupant == client_id)
            .ok_or_else(|| CoordinatorError::NotInRoom {
                client: client_id.clone(),
                room: room_id.clone(),
            })?;

        room.occupants.remove(index);
        let remaining = room.occupants.clone();
        self.clients.set_room(client_id, None);
        info!("{}: left room {}", client_id, room_id);

        if remaining.is_empty() {
            self.rooms.remove_if_empty(room_id);
        } else if remaining.len() == 1 {
            for occupant in &remaining {
                self.push(occupant, ServerMessage::Stop);
            }
        }

        Ok(())
    }

    /// Leaves the client's room, if any, then forgets the client.
    pub fn disconnect(&mut self, client_id: &ClientId) -> Result<(), CoordinatorError> {
        if let Err(e) = self.leave(client_id) {
            warn!("{}: {}", client_id, e);
        }

        self.clients
            .remove(client_id)
            .map(|_| ())
            .ok_or_else(|| CoordinatorError::UnknownClient(client_id.clone()))
    }

    /// Decodes one text frame from the client and applies it.
    ///
    /// Malformed frames and failed requests are logged and otherwise ignored.
    pub fn handle_message(&mut self, client_id: &ClientId, text: &str) {
        let message = match decode_client_message(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("{}: dropping frame: {}", client_id, e);
                return;
            }
        };
        debug!("{}: message {:?}", client_id, message);

        let result = match message {
            ClientMessage::JoinRoom { ignore_video_id } => {
                self.join(client_id, ignore_video_id).map(|_| ())
            }
            ClientMessage::LeaveRoom => self.leave(client_id),
        };

        if let Err(e) = result {
            warn!("{}: {}", client_id, e);
        }
    }

    /// Live rooms in creation order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Looks up a live room by id.
    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.find_by_id(room_id)
    }

    /// The room the client currently occupies, if any.
    pub fn client_room(&self, client_id: &ClientId) -> Option<&RoomId> {
        self.clients
            .find_by_id(client_id)
            .and_then(|client| client.room.as_ref())
    }

    /// True while the client is connected.
    pub fn has_client(&self, client_id: &ClientId) -> bool {
        self.clients.contains(client_id)
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Catalog size videos are drawn from.
    pub fn catalog_size(&self) -> u32 {
        self.catalog_size
    }

    fn fresh_room_id(&mut self) -> RoomId {
        loop {
            let candidate = RoomId::from(IdGenerator::next_id(&mut self.rng));
            if !self.rooms.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn pick_for_new_room(&mut self, exclude: Option<ContentId>) -> Result<ContentId, CoordinatorError> {
        match pick_content(&mut self.rng, self.catalog_size, exclude) {
            Ok(content) => Ok(content),
            Err(SelectError::Exhausted { only }) => {
                warn!(
                    "Cannot avoid video {} in a catalog of one, ignoring the hint",
                    only
                );
                Ok(only)
            }
            Err(SelectError::EmptyCatalog) => Err(CoordinatorError::EmptyCatalog),
        }
    }

    fn push(&self, client_id: &ClientId, message: ServerMessage) {
        match self.clients.find_by_id(client_id) {
            Some(client) => {
                client.push(message);
            }
            None => warn!("{}: cannot push {:?} to unknown client", client_id, message),
        }
    }
}
