//! Tunebox Server Library
//!
//! Multi-user media library server: accounts, uploads, search, streaming and
//! playlists.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use router::create_router;
pub use services::{AuthService, FileStorage, PlaylistService, SongService, UploadLimits};
pub use state::AppState;
