/// Shared application state
use crate::services::{AuthService, FileStorage, PlaylistService, SongService, UploadLimits};
use std::sync::Arc;
use tunebox_core::{PlaylistStore, SongStore, UserStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub auth_service: Arc<AuthService>,
    pub songs: Arc<SongService>,
    pub playlists: Arc<PlaylistService>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        auth_service: Arc<AuthService>,
        songs: Arc<SongService>,
        playlists: Arc<PlaylistService>,
    ) -> Self {
        Self {
            users,
            auth_service,
            songs,
            playlists,
        }
    }

    /// Wire every service over one store that implements all three store traits
    pub fn from_store<S>(
        store: Arc<S>,
        auth_service: Arc<AuthService>,
        file_storage: Arc<FileStorage>,
        limits: UploadLimits,
    ) -> Self
    where
        S: UserStore + SongStore + PlaylistStore + 'static,
    {
        let songs = Arc::new(SongService::new(store.clone(), file_storage, limits));
        let playlists = Arc::new(PlaylistService::new(store.clone(), store.clone()));
        Self::new(store, auth_service, songs, playlists)
    }
}
