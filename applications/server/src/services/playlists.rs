/// Playlist catalog - ownership checks and ordered membership
use crate::error::{Result, ServerError};
use std::sync::Arc;
use tunebox_core::{
    Playlist, PlaylistDetail, PlaylistEntry, PlaylistId, PlaylistStore, SongId, SongStore,
    TuneboxError, UpdatePlaylist, UserId,
};

pub struct PlaylistService {
    playlists: Arc<dyn PlaylistStore>,
    songs: Arc<dyn SongStore>,
}

impl PlaylistService {
    pub fn new(playlists: Arc<dyn PlaylistStore>, songs: Arc<dyn SongStore>) -> Self {
        Self { playlists, songs }
    }

    pub async fn create(
        &self,
        owner: &UserId,
        name: &str,
        description: Option<String>,
    ) -> Result<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServerError::BadRequest(
                "Playlist name is required".to_string(),
            ));
        }
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let playlist = Playlist::new(owner.clone(), name, description);
        self.playlists.insert_playlist(&playlist).await?;

        tracing::info!(playlist_id = %playlist.id, owner = %owner, "Created playlist");
        Ok(playlist)
    }

    pub async fn list(&self, owner: &UserId) -> Result<Vec<Playlist>> {
        Ok(self.playlists.list_playlists(owner).await?)
    }

    /// The playlist with its songs in position order
    pub async fn get(&self, owner: &UserId, id: &PlaylistId) -> Result<PlaylistDetail> {
        let playlist = self.owned(owner, id).await?;
        let songs = self.playlists.get_playlist_songs(&playlist.id).await?;
        Ok(PlaylistDetail { playlist, songs })
    }

    /// Change name and/or description; empty values are ignored
    pub async fn update(
        &self,
        owner: &UserId,
        id: &PlaylistId,
        update: UpdatePlaylist,
    ) -> Result<Playlist> {
        let update = UpdatePlaylist {
            name: update.name.map(|n| n.trim().to_string()),
            description: update.description.map(|d| d.trim().to_string()),
        };

        self.playlists
            .update_playlist(owner, id, update)
            .await?
            .ok_or_else(playlist_not_found)
    }

    pub async fn delete(&self, owner: &UserId, id: &PlaylistId) -> Result<()> {
        if !self.playlists.delete_playlist(owner, id).await? {
            return Err(playlist_not_found());
        }
        tracing::info!(playlist_id = %id, "Deleted playlist");
        Ok(())
    }

    /// Append one of the owner's songs to the end of the playlist
    pub async fn add_song(
        &self,
        owner: &UserId,
        playlist_id: &PlaylistId,
        song_id: &SongId,
    ) -> Result<PlaylistEntry> {
        let playlist = self.owned(owner, playlist_id).await?;

        if self.songs.get_song(owner, song_id).await?.is_none() {
            return Err(ServerError::NotFound("Song not found".to_string()));
        }

        match self.playlists.add_entry(&playlist.id, song_id).await {
            Ok(entry) => Ok(entry),
            Err(TuneboxError::Duplicate(_)) => Err(ServerError::Conflict(
                "Song is already in the playlist".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a song from the playlist; removing a non-member is a no-op
    pub async fn remove_song(
        &self,
        owner: &UserId,
        playlist_id: &PlaylistId,
        song_id: &SongId,
    ) -> Result<()> {
        let playlist = self.owned(owner, playlist_id).await?;
        let removed = self.playlists.remove_entry(&playlist.id, song_id).await?;
        if !removed {
            tracing::debug!(playlist_id = %playlist.id, song_id = %song_id, "Song was not a member");
        }
        Ok(())
    }

    /// Move a member song to a 1-based position, shifting the others
    pub async fn move_song(
        &self,
        owner: &UserId,
        playlist_id: &PlaylistId,
        song_id: &SongId,
        position: u32,
    ) -> Result<()> {
        let playlist = self.owned(owner, playlist_id).await?;

        let count = self.playlists.get_entries(&playlist.id).await?.len();
        if position == 0 || position as usize > count {
            return Err(ServerError::BadRequest(format!(
                "Position must be between 1 and {count}"
            )));
        }

        if !self
            .playlists
            .move_entry(&playlist.id, song_id, position)
            .await?
        {
            return Err(ServerError::NotFound(
                "Song is not in the playlist".to_string(),
            ));
        }
        Ok(())
    }

    async fn owned(&self, owner: &UserId, id: &PlaylistId) -> Result<Playlist> {
        self.playlists
            .get_playlist(owner, id)
            .await?
            .ok_or_else(playlist_not_found)
    }
}

fn playlist_not_found() -> ServerError {
    ServerError::NotFound("Playlist not found".to_string())
}
