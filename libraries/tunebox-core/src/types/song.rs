/// Song domain types
use crate::types::{SongId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uploaded media file and its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Unique song identifier
    pub id: SongId,

    /// Owner user ID, fixed at upload
    pub owner_id: UserId,

    /// Song title
    pub title: String,

    /// Performing artist
    pub artist: Option<String>,

    /// Name of the stored file inside the owner's blob directory
    pub filename: String,

    /// Upload timestamp
    pub created_at: DateTime<Utc>,

    /// Last metadata change
    pub updated_at: DateTime<Utc>,
}

impl Song {
    /// Create a new song with a fresh identifier
    pub fn new(
        owner_id: UserId,
        title: impl Into<String>,
        artist: Option<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self::with_id(SongId::generate(), owner_id, title, artist, filename)
    }

    /// Create a song with a pre-assigned identifier
    pub fn with_id(
        id: SongId,
        owner_id: UserId,
        title: impl Into<String>,
        artist: Option<String>,
        filename: impl Into<String>,
    ) -> Self {
        let now = crate::types::now();
        Self {
            id,
            owner_id,
            title: title.into(),
            artist,
            filename: filename.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place
    ///
    /// An empty artist clears the field.
    pub fn apply(&mut self, update: &UpdateSong) {
        if let Some(title) = &update.title {
            self.title.clone_from(title);
        }
        if let Some(artist) = &update.artist {
            self.artist = if artist.is_empty() {
                None
            } else {
                Some(artist.clone())
            };
        }
        self.updated_at = crate::types::now();
    }
}

/// Partial song update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSong {
    /// New title
    pub title: Option<String>,

    /// New artist (empty string clears it)
    pub artist: Option<String>,
}
