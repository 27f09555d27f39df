//! WebSocket channel pushing catalogue paints to open pages.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use docshelf_render::Container;

/// Messages sent to connected pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Connection established
    Connected,

    /// Replace the content of one catalogue container
    Paint {
        /// Container tag
        tag: String,
        /// New panel markup
        html: String,
        /// Panel identifier, for binding the handlers
        panel_id: String,
        /// Open the panel after painting
        show: bool,
    },

    /// Full page reload
    Reload,
}

impl LiveMessage {
    /// Paint message for a container, if it has been painted.
    pub fn paint(container: &Container) -> Option<Self> {
        container.painted().map(|p| LiveMessage::Paint {
            tag: container.tag().to_string(),
            html: p.markup.to_string(),
            panel_id: p.binding.panel_id().to_string(),
            show: p.binding.show(),
        })
    }
}

/// Hub for broadcasting live messages to all connected pages.
#[derive(Debug, Clone)]
pub struct LiveHub {
    sender: broadcast::Sender<LiveMessage>,
}

impl LiveHub {
    /// Create a new live hub.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected pages.
    pub fn send(&self, msg: LiveMessage) {
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    /// Subscribe to live messages.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveMessage> {
        self.sender.subscribe()
    }

    /// Get the number of connected pages.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new()
    }
}
