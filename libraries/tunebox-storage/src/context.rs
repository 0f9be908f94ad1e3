use crate::{playlists, songs, users};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tunebox_core::{error::Result, storage::*, types::*};

/// Relational store over a `SQLite` pool
///
/// Implements every store trait by delegating to the vertical slices.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        Ok(users::create(&self.pool, user).await?)
    }

    async fn find_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        Ok(users::find_credentials_by_email(&self.pool, email).await?)
    }

    async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool> {
        Ok(users::username_or_email_taken(&self.pool, username, email).await?)
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        Ok(users::get_all(&self.pool).await?)
    }
}

#[async_trait]
impl SongStore for SqliteStore {
    async fn insert_song(&self, song: &Song) -> Result<()> {
        Ok(songs::insert(&self.pool, song).await?)
    }

    async fn get_song(&self, owner: &UserId, id: &SongId) -> Result<Option<Song>> {
        Ok(songs::get_by_id(&self.pool, owner, id).await?)
    }

    async fn list_songs(&self, owner: &UserId, page: Page) -> Result<Vec<Song>> {
        Ok(songs::list_by_owner(&self.pool, owner, page).await?)
    }

    async fn count_songs(&self, owner: &UserId) -> Result<u64> {
        Ok(songs::count_by_owner(&self.pool, owner).await?)
    }

    async fn search_songs(&self, owner: &UserId, query: &str) -> Result<Vec<Song>> {
        Ok(songs::search(&self.pool, owner, query).await?)
    }

    async fn update_song(
        &self,
        owner: &UserId,
        id: &SongId,
        update: UpdateSong,
    ) -> Result<Option<Song>> {
        Ok(songs::update(&self.pool, owner, id, update).await?)
    }

    async fn delete_song(&self, owner: &UserId, id: &SongId) -> Result<bool> {
        Ok(songs::delete(&self.pool, owner, id).await?)
    }
}

#[async_trait]
impl PlaylistStore for SqliteStore {
    async fn insert_playlist(&self, playlist: &Playlist) -> Result<()> {
        Ok(playlists::insert(&self.pool, playlist).await?)
    }

    async fn get_playlist(&self, owner: &UserId, id: &PlaylistId) -> Result<Option<Playlist>> {
        Ok(playlists::get_by_id(&self.pool, owner, id).await?)
    }

    async fn list_playlists(&self, owner: &UserId) -> Result<Vec<Playlist>> {
        Ok(playlists::list_by_owner(&self.pool, owner).await?)
    }

    async fn update_playlist(
        &self,
        owner: &UserId,
        id: &PlaylistId,
        update: UpdatePlaylist,
    ) -> Result<Option<Playlist>> {
        Ok(playlists::update(&self.pool, owner, id, update).await?)
    }

    async fn delete_playlist(&self, owner: &UserId, id: &PlaylistId) -> Result<bool> {
        Ok(playlists::delete(&self.pool, owner, id).await?)
    }

    async fn add_entry(&self, playlist: &PlaylistId, song: &SongId) -> Result<PlaylistEntry> {
        Ok(playlists::add_entry(&self.pool, playlist, song).await?)
    }

    async fn remove_entry(&self, playlist: &PlaylistId, song: &SongId) -> Result<bool> {
        Ok(playlists::remove_entry(&self.pool, playlist, song).await?)
    }

    async fn move_entry(
        &self,
        playlist: &PlaylistId,
        song: &SongId,
        position: u32,
    ) -> Result<bool> {
        Ok(playlists::move_entry(&self.pool, playlist, song, position).await?)
    }

    async fn get_entries(&self, playlist: &PlaylistId) -> Result<Vec<PlaylistEntry>> {
        Ok(playlists::get_entries(&self.pool, playlist).await?)
    }

    async fn get_playlist_songs(&self, playlist: &PlaylistId) -> Result<Vec<PlaylistSong>> {
        Ok(playlists::get_songs(&self.pool, playlist).await?)
    }
}
