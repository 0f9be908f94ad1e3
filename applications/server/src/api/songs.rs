/// Songs API routes
use crate::{
    api::MessageResponse,
    error::{Result, ServerError},
    middleware::{ApiJson, ApiQuery, AuthenticatedUser},
    services::songs::{SongPage, UploadSong},
    state::AppState,
};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tunebox_core::{Song, SongId, UpdateSong};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SongsResponse {
    pub songs: Vec<Song>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub song_id: SongId,
    pub song: Song,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSongRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SongUpdatedResponse {
    pub message: String,
    pub song: Song,
}

/// POST /upload
/// Multipart form with `title`, `artist` and `file`
pub async fn upload_song(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<UploadResponse>> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(format!(
                "File too large (max {} bytes)",
                app_state.songs.limits().max_bytes
            ))
        } else {
            ServerError::BadRequest(rejection.body_text())
        }
    })?;

    let upload = parse_upload(&headers, body).await?;
    let song = app_state.songs.upload(auth.user_id(), upload).await?;

    Ok(Json(UploadResponse {
        message: "Song uploaded successfully".to_string(),
        song_id: song.id.clone(),
        song,
    }))
}

/// GET /songs?page=&limit=
pub async fn list_songs(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<SongPage>> {
    let page = app_state
        .songs
        .list(auth.user_id(), query.page, query.limit)
        .await?;
    Ok(Json(page))
}

/// GET /search?q=
pub async fn search_songs(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<SongsResponse>> {
    let q = query.q.unwrap_or_default();
    let songs = app_state.songs.search(auth.user_id(), &q).await?;
    Ok(Json(SongsResponse { songs }))
}

/// GET /song/:id
pub async fn get_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Song>> {
    let song = app_state
        .songs
        .get(auth.user_id(), &SongId::new(id))
        .await?;
    Ok(Json(song))
}

/// PUT /song/:id
pub async fn update_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<UpdateSongRequest>,
) -> Result<Json<SongUpdatedResponse>> {
    let song = app_state
        .songs
        .update(
            auth.user_id(),
            &SongId::new(id),
            UpdateSong {
                title: req.title,
                artist: req.artist,
            },
        )
        .await?;

    Ok(Json(SongUpdatedResponse {
        message: "Song updated".to_string(),
        song,
    }))
}

/// DELETE /song/:id
pub async fn delete_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<MessageResponse>> {
    app_state
        .songs
        .delete(auth.user_id(), &SongId::new(id))
        .await?;
    Ok(Json(MessageResponse::new("Song deleted")))
}

/// Pull the upload fields out of a buffered multipart body
async fn parse_upload(headers: &HeaderMap, body: Bytes) -> Result<UploadSong> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ServerError::BadRequest("Missing Content-Type".to_string()))?;

    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| ServerError::BadRequest("Expected multipart/form-data".to_string()))?;

    // Convert Bytes to a stream for multer
    let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut title: Option<String> = None;
    let mut artist: Option<String> = None;
    let mut file: Option<(Option<String>, Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(str::to_string);
                let declared = field.content_type().map(|m| m.essence_str().to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Failed to read file: {}", e)))?;
                file = Some((filename, declared, data));
            }
            "title" => title = Some(read_text(field).await?),
            "artist" => artist = Some(read_text(field).await?),
            _ => {}
        }
    }

    let (original_filename, declared_type, bytes) =
        file.ok_or_else(|| ServerError::BadRequest("Missing file".to_string()))?;

    Ok(UploadSong {
        title: title.unwrap_or_default(),
        artist,
        original_filename,
        declared_type,
        bytes,
    })
}

async fn read_text(field: multer::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Failed to read form field: {}", e)))
}
