/// Playlists API routes
use crate::{
    api::MessageResponse,
    error::Result,
    middleware::{ApiJson, AuthenticatedUser},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tunebox_core::{Playlist, PlaylistDetail, PlaylistId, SongId, UpdatePlaylist};

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddSongRequest {
    pub song_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveSongRequest {
    pub position: u32,
}

#[derive(Debug, Serialize)]
pub struct PlaylistsResponse {
    pub playlists: Vec<Playlist>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistUpdatedResponse {
    pub message: String,
    pub playlist: Playlist,
}

#[derive(Debug, Serialize)]
pub struct SongAddedResponse {
    pub message: String,
    pub position: u32,
}

/// GET /playlists
pub async fn list_playlists(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<PlaylistsResponse>> {
    let playlists = app_state.playlists.list(auth.user_id()).await?;
    Ok(Json(PlaylistsResponse { playlists }))
}

/// POST /playlists
pub async fn create_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<CreatePlaylistRequest>,
) -> Result<(StatusCode, Json<Playlist>)> {
    let playlist = app_state
        .playlists
        .create(auth.user_id(), &req.name, req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /playlist/:id
/// Playlist details with songs in position order
pub async fn get_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<PlaylistDetail>> {
    let detail = app_state
        .playlists
        .get(auth.user_id(), &PlaylistId::new(id))
        .await?;
    Ok(Json(detail))
}

/// PUT /playlist/:id
pub async fn update_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<UpdatePlaylistRequest>,
) -> Result<Json<PlaylistUpdatedResponse>> {
    let playlist = app_state
        .playlists
        .update(
            auth.user_id(),
            &PlaylistId::new(id),
            UpdatePlaylist {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok(Json(PlaylistUpdatedResponse {
        message: "Playlist updated".to_string(),
        playlist,
    }))
}

/// DELETE /playlist/:id
pub async fn delete_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<MessageResponse>> {
    app_state
        .playlists
        .delete(auth.user_id(), &PlaylistId::new(id))
        .await?;
    Ok(Json(MessageResponse::new("Playlist deleted")))
}

/// POST /playlist/:id/songs
pub async fn add_song_to_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<AddSongRequest>,
) -> Result<(StatusCode, Json<SongAddedResponse>)> {
    let entry = app_state
        .playlists
        .add_song(
            auth.user_id(),
            &PlaylistId::new(id),
            &SongId::new(req.song_id),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SongAddedResponse {
            message: "Song added to playlist".to_string(),
            position: entry.position,
        }),
    ))
}

/// DELETE /playlist/:id/songs/:song_id
pub async fn remove_song_from_playlist(
    Path((id, song_id)): Path<(String, String)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<MessageResponse>> {
    app_state
        .playlists
        .remove_song(
            auth.user_id(),
            &PlaylistId::new(id),
            &SongId::new(song_id),
        )
        .await?;
    Ok(Json(MessageResponse::new("Song removed from playlist")))
}

/// PUT /playlist/:id/songs/:song_id
/// Move a song to a new position
pub async fn move_song_in_playlist(
    Path((id, song_id)): Path<(String, String)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<MoveSongRequest>,
) -> Result<Json<MessageResponse>> {
    app_state
        .playlists
        .move_song(
            auth.user_id(),
            &PlaylistId::new(id),
            &SongId::new(song_id),
            req.position,
        )
        .await?;
    Ok(Json(MessageResponse::new("Song moved")))
}
