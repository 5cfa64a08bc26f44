//! # Watch-Party Terminal Client
//!
//! A small command-line stand-in for the browser page. It connects to the
//! server's WebSocket, sends join and leave requests typed on stdin, and
//! prints the room state the server pushes back.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Parses viewer commands such as `join 3`, `next` and `leave`.
//!
//! ### Session Module (`session`)
//! Tracks the assigned video and whether playback is waiting, playing or
//! stopped. Remembers the last video so `next` can ask the server to avoid it.
//!
//! ### Network Module (`network`)
//! Owns the WebSocket connection and multiplexes server frames with stdin.

pub mod input;
pub mod network;
pub mod session;
