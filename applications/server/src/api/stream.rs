/// Audio streaming API
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use tunebox_core::SongId;

/// GET /stream/:id
/// Stream the stored file with range request support
pub async fn stream_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<Response> {
    let range_header = headers
        .get(header::RANGE)
        .map(|range| {
            range
                .to_str()
                .map_err(|_| ServerError::BadRequest("Invalid Range header".to_string()))
        })
        .transpose()?;

    let stream = app_state
        .songs
        .open_stream(auth.user_id(), &SongId::new(id), range_header)
        .await?;

    let content_length = stream.body_len();
    let builder = Response::builder()
        .header(header::CONTENT_TYPE, &stream.content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::ACCEPT_RANGES, "bytes");

    let builder = match stream.range {
        Some(range) => builder.status(StatusCode::PARTIAL_CONTENT).header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", range.start, range.end, stream.file_size),
        ),
        None => builder.status(StatusCode::OK),
    };

    // The file is already positioned at the range start
    let reader = ReaderStream::new(stream.file.take(content_length));

    builder
        .body(Body::from_stream(reader))
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))
}
