//! In-process store with document-style collections
//!
//! Mirrors `SqliteStore` behavior: owner-scoped lookups, unique usernames,
//! emails and playlist memberships, and dense 1-based positions.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tunebox_core::{error::Result, storage::*, types::*, TuneboxError};

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<UserId, UserCredentials>,
    songs: HashMap<SongId, Song>,
    playlists: HashMap<PlaylistId, Playlist>,
    entries: Vec<PlaylistEntry>,
}

impl Collections {
    fn owned_song(&self, owner: &UserId, id: &SongId) -> Option<&Song> {
        self.songs.get(id).filter(|s| &s.owner_id == owner)
    }

    fn owned_playlist(&self, owner: &UserId, id: &PlaylistId) -> Option<&Playlist> {
        self.playlists.get(id).filter(|p| &p.owner_id == owner)
    }

    fn entries_of(&self, playlist: &PlaylistId) -> Vec<PlaylistEntry> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|e| &e.playlist_id == playlist)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.position.cmp(&b.position).then(a.added_at.cmp(&b.added_at)));
        entries
    }

    /// Rewrite positions of one playlist to follow `order`
    fn renumber(&mut self, playlist: &PlaylistId, order: &[SongId]) {
        for entry in self.entries.iter_mut().filter(|e| &e.playlist_id == playlist) {
            if let Some(index) = order.iter().position(|id| id == &entry.song_id) {
                entry.position = index as u32 + 1;
            }
        }
    }

    /// Renumber a playlist's remaining entries to 1..N after a removal
    fn close_gaps(&mut self, playlist: &PlaylistId) {
        let order: Vec<SongId> = self
            .entries_of(playlist)
            .into_iter()
            .map(|e| e.song_id)
            .collect();
        self.renumber(playlist, &order);
        self.touch(playlist);
    }

    fn touch(&mut self, playlist: &PlaylistId) {
        if let Some(p) = self.playlists.get_mut(playlist) {
            p.updated_at = now();
        }
    }
}

/// Store keeping every collection in memory behind one lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut data = self.inner.write().await;

        let taken = data
            .users
            .values()
            .any(|c| c.user.username == user.username || c.user.email == user.email);
        if taken {
            return Err(TuneboxError::duplicate("user already exists"));
        }

        let created = User {
            id: UserId::generate(),
            username: user.username,
            email: user.email,
            created_at: now(),
        };
        data.users.insert(
            created.id.clone(),
            UserCredentials {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );

        Ok(created)
    }

    async fn find_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        let data = self.inner.read().await;
        Ok(data.users.values().find(|c| c.user.email == email).cloned())
    }

    async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool> {
        let data = self.inner.read().await;
        Ok(data
            .users
            .values()
            .any(|c| c.user.username == username || c.user.email == email))
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        let data = self.inner.read().await;
        let mut users: Vec<User> = data.users.values().map(|c| c.user.clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

#[async_trait]
impl SongStore for MemoryStore {
    async fn insert_song(&self, song: &Song) -> Result<()> {
        let mut data = self.inner.write().await;
        if data.songs.contains_key(&song.id) {
            return Err(TuneboxError::duplicate(format!("song {} exists", song.id)));
        }
        data.songs.insert(song.id.clone(), song.clone());
        Ok(())
    }

    async fn get_song(&self, owner: &UserId, id: &SongId) -> Result<Option<Song>> {
        let data = self.inner.read().await;
        Ok(data.owned_song(owner, id).cloned())
    }

    async fn list_songs(&self, owner: &UserId, page: Page) -> Result<Vec<Song>> {
        let data = self.inner.read().await;
        let mut songs: Vec<Song> = data
            .songs
            .values()
            .filter(|s| &s.owner_id == owner)
            .cloned()
            .collect();
        songs.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));

        Ok(songs
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn count_songs(&self, owner: &UserId) -> Result<u64> {
        let data = self.inner.read().await;
        Ok(data.songs.values().filter(|s| &s.owner_id == owner).count() as u64)
    }

    async fn search_songs(&self, owner: &UserId, query: &str) -> Result<Vec<Song>> {
        let needle = query.to_lowercase();
        let data = self.inner.read().await;
        let mut songs: Vec<Song> = data
            .songs
            .values()
            .filter(|s| &s.owner_id == owner)
            .filter(|s| {
                s.title.to_lowercase().contains(&needle)
                    || s
                        .artist
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        songs.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(songs)
    }

    async fn update_song(
        &self,
        owner: &UserId,
        id: &SongId,
        update: UpdateSong,
    ) -> Result<Option<Song>> {
        let mut data = self.inner.write().await;
        let Some(song) = data.songs.get_mut(id).filter(|s| &s.owner_id == owner) else {
            return Ok(None);
        };
        song.apply(&update);
        Ok(Some(song.clone()))
    }

    async fn delete_song(&self, owner: &UserId, id: &SongId) -> Result<bool> {
        let mut data = self.inner.write().await;
        if data.owned_song(owner, id).is_none() {
            return Ok(false);
        }
        data.songs.remove(id);

        let affected: Vec<PlaylistId> = data
            .entries
            .iter()
            .filter(|e| &e.song_id == id)
            .map(|e| e.playlist_id.clone())
            .collect();
        data.entries.retain(|e| &e.song_id != id);
        for playlist in &affected {
            data.close_gaps(playlist);
        }

        Ok(true)
    }
}

#[async_trait]
impl PlaylistStore for MemoryStore {
    async fn insert_playlist(&self, playlist: &Playlist) -> Result<()> {
        let mut data = self.inner.write().await;
        if data.playlists.contains_key(&playlist.id) {
            return Err(TuneboxError::duplicate(format!(
                "playlist {} exists",
                playlist.id
            )));
        }
        data.playlists.insert(playlist.id.clone(), playlist.clone());
        Ok(())
    }

    async fn get_playlist(&self, owner: &UserId, id: &PlaylistId) -> Result<Option<Playlist>> {
        let data = self.inner.read().await;
        Ok(data.owned_playlist(owner, id).cloned())
    }

    async fn list_playlists(&self, owner: &UserId) -> Result<Vec<Playlist>> {
        let data = self.inner.read().await;
        let mut playlists: Vec<Playlist> = data
            .playlists
            .values()
            .filter(|p| &p.owner_id == owner)
            .cloned()
            .collect();
        playlists.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(playlists)
    }

    async fn update_playlist(
        &self,
        owner: &UserId,
        id: &PlaylistId,
        update: UpdatePlaylist,
    ) -> Result<Option<Playlist>> {
        let mut data = self.inner.write().await;
        let Some(playlist) = data.playlists.get_mut(id).filter(|p| &p.owner_id == owner) else {
            return Ok(None);
        };
        playlist.apply(&update);
        Ok(Some(playlist.clone()))
    }

    async fn delete_playlist(&self, owner: &UserId, id: &PlaylistId) -> Result<bool> {
        let mut data = self.inner.write().await;
        if data.owned_playlist(owner, id).is_none() {
            return Ok(false);
        }
        data.entries.retain(|e| &e.playlist_id != id);
        data.playlists.remove(id);
        Ok(true)
    }

    async fn add_entry(&self, playlist: &PlaylistId, song: &SongId) -> Result<PlaylistEntry> {
        let mut data = self.inner.write().await;

        let existing = data.entries.iter().filter(|e| &e.playlist_id == playlist);
        let mut max_position: u32 = 0;
        for entry in existing {
            if &entry.song_id == song {
                return Err(TuneboxError::duplicate("song is already in the playlist"));
            }
            max_position = max_position.max(entry.position);
        }

        let entry = PlaylistEntry::new(playlist.clone(), song.clone(), max_position + 1);
        data.entries.push(entry.clone());
        data.touch(playlist);

        Ok(entry)
    }

    async fn remove_entry(&self, playlist: &PlaylistId, song: &SongId) -> Result<bool> {
        let mut data = self.inner.write().await;

        let before = data.entries.len();
        data.entries
            .retain(|e| !(&e.playlist_id == playlist && &e.song_id == song));
        let removed = data.entries.len() < before;

        if removed {
            data.close_gaps(playlist);
        }

        Ok(removed)
    }

    async fn move_entry(
        &self,
        playlist: &PlaylistId,
        song: &SongId,
        position: u32,
    ) -> Result<bool> {
        let mut data = self.inner.write().await;

        let mut order: Vec<SongId> = data
            .entries_of(playlist)
            .into_iter()
            .map(|e| e.song_id)
            .collect();
        let Some(current) = order.iter().position(|id| id == song) else {
            return Ok(false);
        };

        let moved = order.remove(current);
        let target = (position.max(1) as usize - 1).min(order.len());
        order.insert(target, moved);

        data.renumber(playlist, &order);
        data.touch(playlist);

        Ok(true)
    }

    async fn get_entries(&self, playlist: &PlaylistId) -> Result<Vec<PlaylistEntry>> {
        let data = self.inner.read().await;
        Ok(data.entries_of(playlist))
    }

    async fn get_playlist_songs(&self, playlist: &PlaylistId) -> Result<Vec<PlaylistSong>> {
        let data = self.inner.read().await;
        Ok(data
            .entries_of(playlist)
            .into_iter()
            .filter_map(|entry| {
                data.songs.get(&entry.song_id).map(|song| PlaylistSong {
                    position: entry.position,
                    song: song.clone(),
                })
            })
            .collect())
    }
}
