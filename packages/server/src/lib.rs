//! Session room coordinator for live tutoring sessions.
//!
//! Tracks which connections are in which session room, enforces room
//! occupancy and relays opaque signaling / chat payloads between the
//! members of a room over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
