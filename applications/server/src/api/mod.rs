/// API route modules
pub mod auth;
pub mod health;
pub mod playlists;
pub mod songs;
pub mod stream;

use serde::Serialize;

/// Plain acknowledgement body for mutations that return nothing else
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
