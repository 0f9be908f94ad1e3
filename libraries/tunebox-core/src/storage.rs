//! Store traits for users, songs and playlists
//!
//! These traits abstract persistence so the relational (`SQLite`) and
//! document-style (in-memory) back-ends can be swapped without touching the
//! business rules built on top of them.

use crate::error::Result;
use crate::types::{
    NewUser, Page, Playlist, PlaylistEntry, PlaylistId, PlaylistSong, Song, SongId,
    UpdatePlaylist, UpdateSong, User, UserCredentials, UserId,
};
use async_trait::async_trait;

/// Identity store: user records and their credential hashes
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user with a fresh identifier
    ///
    /// Fails with `Duplicate` if the username or email is already taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Look up a user and password hash by email
    async fn find_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>>;

    /// Whether any user already has this username or email
    async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool>;

    /// Get all users ordered by username
    async fn get_all_users(&self) -> Result<Vec<User>>;
}

/// Media store: song metadata, always scoped to the owner
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Persist a new song record
    async fn insert_song(&self, song: &Song) -> Result<()>;

    /// Get a song owned by `owner`
    async fn get_song(&self, owner: &UserId, id: &SongId) -> Result<Option<Song>>;

    /// Page through the owner's songs (stable order: upload time, then id)
    async fn list_songs(&self, owner: &UserId, page: Page) -> Result<Vec<Song>>;

    /// Number of songs the owner has
    async fn count_songs(&self, owner: &UserId) -> Result<u64>;

    /// Case-insensitive substring match over title or artist
    async fn search_songs(&self, owner: &UserId, query: &str) -> Result<Vec<Song>>;

    /// Apply a partial update, returning the updated song if it exists
    async fn update_song(
        &self,
        owner: &UserId,
        id: &SongId,
        update: UpdateSong,
    ) -> Result<Option<Song>>;

    /// Delete a song record, returning whether it existed
    async fn delete_song(&self, owner: &UserId, id: &SongId) -> Result<bool>;
}

/// Playlist store: playlists and their ordered membership entries
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Persist a new playlist record
    async fn insert_playlist(&self, playlist: &Playlist) -> Result<()>;

    /// Get a playlist owned by `owner`
    async fn get_playlist(&self, owner: &UserId, id: &PlaylistId) -> Result<Option<Playlist>>;

    /// All playlists owned by `owner`, oldest first
    async fn list_playlists(&self, owner: &UserId) -> Result<Vec<Playlist>>;

    /// Apply a partial update, returning the updated playlist if it exists
    async fn update_playlist(
        &self,
        owner: &UserId,
        id: &PlaylistId,
        update: UpdatePlaylist,
    ) -> Result<Option<Playlist>>;

    /// Delete all entries of the playlist and then the playlist itself
    ///
    /// Returns whether the playlist existed.
    async fn delete_playlist(&self, owner: &UserId, id: &PlaylistId) -> Result<bool>;

    /// Append a song at `max(position) + 1`
    ///
    /// Fails with `Duplicate` if the song is already a member.
    async fn add_entry(&self, playlist: &PlaylistId, song: &SongId) -> Result<PlaylistEntry>;

    /// Remove a membership entry and close the gap it leaves
    ///
    /// Returns whether an entry was removed.
    async fn remove_entry(&self, playlist: &PlaylistId, song: &SongId) -> Result<bool>;

    /// Move a member song to `position`, shifting the others
    ///
    /// Returns `false` if the song is not a member.
    async fn move_entry(&self, playlist: &PlaylistId, song: &SongId, position: u32)
        -> Result<bool>;

    /// Raw membership entries ordered by position
    async fn get_entries(&self, playlist: &PlaylistId) -> Result<Vec<PlaylistEntry>>;

    /// Member songs ordered by position; entries whose song is gone are skipped
    async fn get_playlist_songs(&self, playlist: &PlaylistId) -> Result<Vec<PlaylistSong>>;
}
