//! Shared utilities for the juku session room coordinator.
//!
//! Time handling and logger setup used by both the server and the CLI
//! client.

pub mod logger;
pub mod time;
