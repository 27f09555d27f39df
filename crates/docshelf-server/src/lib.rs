//! Development server with live catalogue repaints.
//!
//! Serves the catalogue page, watches catalogue files, and pushes fresh
//! panel markup to open pages over a WebSocket.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{LiveHub, LiveMessage};
