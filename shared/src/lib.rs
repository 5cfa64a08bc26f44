use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Catalog size used when none is configured.
pub const DEFAULT_CATALOG_SIZE: u32 = 4;
/// Maximum number of occupants in a room.
pub const ROOM_CAPACITY: usize = 2;

/// Key into the external video catalog, valid range `1..=catalog_size`.
pub type ContentId = u32;

/// Frames sent by a watch client.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "joinRoom")]
    JoinRoom {
        #[serde(
            rename = "ignoreVideoId",
            default,
            deserialize_with = "lenient_content_id",
            skip_serializing_if = "Option::is_none"
        )]
        ignore_video_id: Option<ContentId>,
    },
    #[serde(rename = "leaveRoom")]
    LeaveRoom,
}

/// Reads an optional hint that may be any JSON number.
///
/// Values no catalog can contain (negative, fractional or too large) become
/// `None` rather than failing the whole frame.
fn lenient_content_id<'de, D>(deserializer: D) -> Result<Option<ContentId>, D::Error>
where
    D: Deserializer<'de>,
{
    let hint = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(hint
        .and_then(|number| number.as_u64())
        .and_then(|id| ContentId::try_from(id).ok())
        .filter(|&id| id > 0))
}

/// Frames pushed by the server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "VIDEO_ID")]
    VideoId { id: ContentId },
    #[serde(rename = "PLAY")]
    Play,
    #[serde(rename = "STOP")]
    Stop,
}

/// A text frame that does not match the message protocol.
#[derive(Debug)]
pub struct ProtocolError(serde_json::Error);

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed message: {}", self.0)
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

pub fn decode_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError)
}

pub fn decode_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError)
}

pub fn encode<T: Serialize>(message: &T) -> String {
    // Both message enums only hold integers and unit variants.
    serde_json::to_string(message).unwrap_or_default()
}
