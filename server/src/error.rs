use crate::ids::{ClientId, RoomId};
use std::fmt;

/// Failures inside the matchmaking core.
///
/// None of these reach the originating client; the coordinator logs them and
/// leaves registry state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    UnknownClient(ClientId),
    UnknownRoom(RoomId),
    NotInRoom { client: ClientId, room: RoomId },
    RoomExists(RoomId),
    RoomFull(RoomId),
    EmptyCatalog,
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorError::UnknownClient(id) => write!(f, "client {} not found", id),
            CoordinatorError::UnknownRoom(id) => write!(f, "room {} not found", id),
            CoordinatorError::NotInRoom { client, room } => {
                write!(f, "client {} not found in room {}", client, room)
            }
            CoordinatorError::RoomExists(id) => write!(f, "room {} already exists", id),
            CoordinatorError::RoomFull(id) => write!(f, "room {} is full", id),
            CoordinatorError::EmptyCatalog => write!(f, "catalog has no content to pick from"),
        }
    }
}

impl std::error::Error for CoordinatorError {}

/// Startup configuration rejected before any socket is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidCatalogSize(u32),
    InvalidAddress(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCatalogSize(size) => {
                write!(f, "catalog size must be at least 1, got {}", size)
            }
            ConfigError::InvalidAddress(addr) => write!(f, "invalid listen address {}", addr),
        }
    }
}

impl std::error::Error for ConfigError {}
