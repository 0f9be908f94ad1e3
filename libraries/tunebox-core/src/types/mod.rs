//! Domain types for Tunebox entities

mod ids;
mod page;
mod playlist;
mod song;
mod user;

pub use ids::{PlaylistId, SongId, UserId};
pub use page::Page;
pub use playlist::{Playlist, PlaylistDetail, PlaylistEntry, PlaylistSong, UpdatePlaylist};
pub use song::{Song, UpdateSong};
pub use user::{NewUser, User, UserCredentials};

/// Current time truncated to whole milliseconds, the precision stores keep
pub fn now() -> chrono::DateTime<chrono::Utc> {
    use chrono::SubsecRound;
    chrono::Utc::now().trunc_subsecs(3)
}
