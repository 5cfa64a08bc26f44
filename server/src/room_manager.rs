//! Registry of live rooms
//!
//! Rooms are kept in creation order so that the first joinable room found is
//! always the oldest one with a free slot. The registry does no locking; the
//! coordinator that owns it is the only writer.

use crate::error::CoordinatorError;
use crate::ids::{ClientId, RoomId};
use log::debug;
use shared::{ContentId, ROOM_CAPACITY};

/// A matchmaking unit holding at most two clients and one fixed content id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub content: ContentId,
    /// Occupants in arrival order
    pub occupants: Vec<ClientId>,
}

impl Room {
    pub fn new(id: RoomId, content: ContentId) -> Self {
        Self {
            id,
            content,
            occupants: Vec::with_capacity(ROOM_CAPACITY),
        }
    }

    pub fn is_joinable(&self) -> bool {
        self.occupants.len() < ROOM_CAPACITY
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= ROOM_CAPACITY
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.occupants.contains(client_id)
    }
}

#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: Vec<Room>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self { rooms: Vec::new() }
    }

    /// Returns the first room, in creation order, with a free slot.
    pub fn find_joinable(&self) -> Option<&Room> {
        self.rooms.iter().find(|room| room.is_joinable())
    }

    pub fn find_by_id(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| &room.id == room_id)
    }

    pub fn find_by_id_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|room| &room.id == room_id)
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.find_by_id(room_id).is_some()
    }

    /// Inserts an empty room. Fails if a live room already uses `room_id`.
    pub fn create(
        &mut self,
        room_id: RoomId,
        content: ContentId,
    ) -> Result<&mut Room, CoordinatorError> {
        if self.contains(&room_id) {
            return Err(CoordinatorError::RoomExists(room_id));
        }

        debug!("Created room {} with content {}", room_id, content);
        self.rooms.push(Room::new(room_id, content));
        let index = self.rooms.len() - 1;
        Ok(&mut self.rooms[index])
    }

    /// Deletes the room if nobody is left in it. Returns true if a room was removed.
    pub fn remove_if_empty(&mut self, room_id: &RoomId) -> bool {
        let before = self.rooms.len();
        self.rooms
            .retain(|room| &room.id != room_id || !room.occupants.is_empty());

        let removed = self.rooms.len() < before;
        if removed {
            debug!("Removed empty room {}", room_id);
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
