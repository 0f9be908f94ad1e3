/// Playlist domain types
use crate::types::{PlaylistId, Song, SongId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Owner user ID
    pub owner_id: UserId,

    /// Playlist name
    pub name: String,

    /// Free-form description
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last change to the playlist record
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    /// Create a new playlist
    pub fn new(owner_id: UserId, name: impl Into<String>, description: Option<String>) -> Self {
        let now = crate::types::now();
        Self {
            id: PlaylistId::generate(),
            owner_id,
            name: name.into(),
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place
    ///
    /// Only supplied, non-empty fields change.
    pub fn apply(&mut self, update: &UpdatePlaylist) {
        if let Some(name) = update.name.as_deref().filter(|n| !n.is_empty()) {
            self.name = name.to_string();
        }
        if let Some(description) = update.description.as_deref().filter(|d| !d.is_empty()) {
            self.description = Some(description.to_string());
        }
        self.updated_at = crate::types::now();
    }
}

/// Partial playlist update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePlaylist {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Playlist membership record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// Playlist ID
    pub playlist_id: PlaylistId,

    /// Song ID
    pub song_id: SongId,

    /// Position in the playlist (1-indexed)
    pub position: u32,

    /// When the song was added to the playlist
    pub added_at: DateTime<Utc>,
}

impl PlaylistEntry {
    /// Create a new membership record
    pub fn new(playlist_id: PlaylistId, song_id: SongId, position: u32) -> Self {
        Self {
            playlist_id,
            song_id,
            position,
            added_at: crate::types::now(),
        }
    }
}

/// A member song resolved from its entry, with its position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSong {
    /// Position in the playlist (1-indexed)
    pub position: u32,

    /// The resolved song record
    #[serde(flatten)]
    pub song: Song,
}

/// A playlist with its songs ordered by ascending position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDetail {
    /// Playlist record
    pub playlist: Playlist,

    /// Member songs
    pub songs: Vec<PlaylistSong>,
}
