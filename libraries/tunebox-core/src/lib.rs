//! Tunebox Core
//!
//! Domain types, store traits, and error handling shared by the Tunebox
//! storage back-ends and the HTTP server.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Song`, `Playlist`, `PlaylistEntry`
//! - **Store Traits**: `UserStore`, `SongStore`, `PlaylistStore`
//! - **Error Handling**: Unified `TuneboxError` and `Result` types
//!
//! Every song and playlist operation on the store traits is scoped by the
//! owning user's id, so a record owned by someone else looks exactly like a
//! record that does not exist.
//!
//! # Example
//!
//! ```rust
//! use tunebox_core::types::{Playlist, Song, UserId};
//!
//! let owner = UserId::generate();
//! let song = Song::new(owner.clone(), "Intro", Some("Band".to_string()), "intro.mp3");
//! let playlist = Playlist::new(owner.clone(), "Mornings", None);
//!
//! assert_eq!(song.owner_id, playlist.owner_id);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{Result, TuneboxError};
pub use storage::{PlaylistStore, SongStore, UserStore};

pub use types::{
    NewUser, Page, Playlist, PlaylistDetail, PlaylistEntry, PlaylistId, PlaylistSong, Song,
    SongId, UpdatePlaylist, UpdateSong, User, UserCredentials, UserId,
};
