//! Client-side view of the current room
//!
//! The server never tells a client which room it is in, only which video the
//! room plays and when to start or stop. This module folds those pushes into
//! a small playback state and turns viewer commands into protocol messages.

use crate::input::Command;
use log::info;
use shared::{ClientMessage, ContentId, ServerMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Not in a room
    Idle,
    /// In a room, waiting for a second viewer
    Waiting,
    /// Paired and playing
    Playing,
    /// Partner left, waiting for a new one
    Stopped,
}

#[derive(Debug)]
pub struct Session {
    pub video: Option<ContentId>,
    pub playback: Playback,
    /// Most recent video, kept after leaving so `next` can avoid it
    pub last_video: Option<ContentId>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            video: None,
            playback: Playback::Idle,
            last_video: None,
        }
    }

    /// Applies a server push to the local state
    pub fn apply(&mut self, message: &ServerMessage) {
        match message {
            ServerMessage::VideoId { id } => {
                info!("Assigned video {}", id);
                self.video = Some(*id);
                self.last_video = Some(*id);
                self.playback = Playback::Waiting;
            }
            ServerMessage::Play => {
                info!("Partner found, playing video {:?}", self.video);
                self.playback = Playback::Playing;
            }
            ServerMessage::Stop => {
                info!("Partner left, playback stopped");
                self.playback = Playback::Stopped;
            }
        }
    }

    /// Translates a viewer command into the message to send, if any
    pub fn request_for(&mut self, command: Command) -> Option<ClientMessage> {
        match command {
            Command::Join { ignore } => Some(ClientMessage::JoinRoom {
                ignore_video_id: ignore,
            }),
            Command::Next => Some(ClientMessage::JoinRoom {
                ignore_video_id: self.last_video,
            }),
            Command::Leave => {
                self.video = None;
                self.playback = Playback::Idle;
                Some(ClientMessage::LeaveRoom)
            }
            Command::Quit | Command::Help => None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let mut session = Session::new();
        assert_eq!(session.playback, Playback::Idle);

        session.apply(&ServerMessage::VideoId { id: 3 });
        assert_eq!(session.video, Some(3));
        assert_eq!(session.playback, Playback::Waiting);

        session.apply(&ServerMessage::Play);
        assert_eq!(session.playback, Playback::Playing);

        session.apply(&ServerMessage::Stop);
        assert_eq!(session.playback, Playback::Stopped);
        assert_eq!(session.video, Some(3));
    }

    #[test]
    fn test_next_avoids_last_video() {
        let mut session = Session::new();
        assert_eq!(
            session.request_for(Command::Next),
            Some(ClientMessage::JoinRoom {
                ignore_video_id: None
            })
        );

        session.apply(&ServerMessage::VideoId { id: 2 });
        assert_eq!(
            session.request_for(Command::Leave),
            Some(ClientMessage::LeaveRoom)
        );
        assert_eq!(session.playback, Playback::Idle);
        assert_eq!(
            session.request_for(Command::Next),
            Some(ClientMessage::JoinRoom {
                ignore_video_id: Some(2)
            })
        );
    }

    #[test]
    fn test_local_commands_send_nothing() {
        let mut session = Session::new();
        assert_eq!(session.request_for(Command::Help), None);
        assert_eq!(session.request_for(Command::Quit), None);
    }
}
