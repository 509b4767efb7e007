// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the transport adapter:
//! - Application state management
//! - HTTP/WebSocket routing
//! - Game session orchestration (match registry, client sockets, wire messages)

pub mod state;
pub mod router;
pub mod game_session;
pub mod ws_error;
