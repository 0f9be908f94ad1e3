/// Server services
pub mod auth;
pub mod file_storage;
pub mod playlists;
pub mod songs;

pub use auth::AuthService;
pub use file_storage::FileStorage;
pub use playlists::PlaylistService;
pub use songs::{SongService, UploadLimits};
