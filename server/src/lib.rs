//! # Watch-Party Server Library
//!
//! This library pairs anonymous viewers into two-person rooms so they can
//! watch the same randomly chosen video in sync. Clients connect over a
//! WebSocket, ask to join a room, and are told which video their room plays
//! and when playback should start or stop.
//!
//! ## Core Responsibilities
//!
//! ### Matchmaking
//! A join request places the client in the oldest room that still has a free
//! slot, or creates a new room when none does. The room's video is picked when
//! the room is created and never changes while anyone is in it.
//!
//! ### Lifecycle Broadcasting
//! When a room fills up both occupants are told to start playback. When one of
//! them leaves, the one left behind is told to stop.
//!
//! ### Cleanup
//! Leaving, whether explicit or through a dropped connection, removes the
//! client from its room and deletes the room as soon as it is empty.
//!
//! ## Architecture Design
//!
//! ### Single Event Queue
//! Connection tasks never touch matchmaking state. They turn connect, message
//! and disconnect events into [`network::Event`] values and send them to one
//! task that owns the [`coordinator::Coordinator`]. Events are applied one at a
//! time, so two clients racing for the last slot of a room are always
//! serialized.
//!
//! ### Fire-and-Forget Pushes
//! Each client has an unbounded outbound channel drained by its own writer
//! task. The coordinator never waits on socket I/O.
//!
//! ## Module Organization
//!
//! - `ids`: random base36 client and room identifiers
//! - `selector`: uniform video selection with an optional id to avoid
//! - `room_manager`: live rooms in creation order
//! - `client_manager`: connected clients and their current room
//! - `coordinator`: join, leave and disconnect procedures
//! - `config` / `error`: startup settings and error types
//! - `pages`: the two static pages served to plain HTTP requests
//! - `network`: axum router, WebSocket connections and the event loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::Config;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Four videos in the catalog, pages served from ./public
//!     let config = Config::new("127.0.0.1", 3000, 4, "public")?;
//!     let server = Server::bind(config).await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod ids;
pub mod network;
pub mod pages;
pub mod room_manager;
pub mod selector;
