/// Song catalog - upload validation, owner-scoped queries and blob bookkeeping
use crate::error::{Result, ServerError};
use crate::services::FileStorage;
use bytes::Bytes;
use serde::Serialize;
use std::io::SeekFrom;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncSeekExt;
use tunebox_core::{Page, Song, SongId, SongStore, UpdateSong, UserId};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// What an upload may be
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_bytes: u64,
    pub allowed_media_types: Vec<String>,
}

impl UploadLimits {
    pub fn new(max_bytes: u64, allowed_media_types: Vec<String>) -> Self {
        Self {
            max_bytes,
            allowed_media_types: allowed_media_types
                .iter()
                .map(|t| normalize_media_type(t))
                .collect(),
        }
    }

    fn allows(&self, media_type: &str) -> bool {
        self.allowed_media_types.iter().any(|t| t == media_type)
    }
}

/// A received upload, before validation
#[derive(Debug, Clone)]
pub struct UploadSong {
    pub title: String,
    pub artist: Option<String>,
    /// Client-side file name; only its extension is kept
    pub original_filename: Option<String>,
    /// Media type from the multipart part header, if the client sent one
    pub declared_type: Option<String>,
    pub bytes: Bytes,
}

/// One page of an owner's songs
#[derive(Debug, Clone, Serialize)]
pub struct SongPage {
    pub songs: Vec<Song>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

/// Inclusive byte range within a stored file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn byte_count(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// An opened song file, positioned at the start of the requested bytes
#[derive(Debug)]
pub struct SongStream {
    pub file: File,
    /// Full size of the stored file
    pub file_size: u64,
    pub content_type: String,
    pub range: Option<ByteRange>,
}

impl SongStream {
    /// Number of bytes the response body carries
    pub fn body_len(&self) -> u64 {
        self.range.map_or(self.file_size, |r| r.byte_count())
    }
}

pub struct SongService {
    songs: Arc<dyn SongStore>,
    blobs: Arc<FileStorage>,
    limits: UploadLimits,
}

impl SongService {
    pub fn new(songs: Arc<dyn SongStore>, blobs: Arc<FileStorage>, limits: UploadLimits) -> Self {
        Self {
            songs,
            blobs,
            limits,
        }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Validate and store an upload, returning the new song
    pub async fn upload(&self, owner: &UserId, upload: UploadSong) -> Result<Song> {
        if upload.bytes.len() as u64 > self.limits.max_bytes {
            return Err(ServerError::PayloadTooLarge(format!(
                "File too large (max {} bytes)",
                self.limits.max_bytes
            )));
        }

        let media_type = upload
            .declared_type
            .as_deref()
            .map(normalize_media_type)
            .filter(|t| !t.is_empty())
            .or_else(|| {
                upload
                    .original_filename
                    .as_deref()
                    .and_then(|name| mime_guess::from_path(name).first())
                    .map(|mime| mime.essence_str().to_string())
            })
            .unwrap_or_default();

        if !self.limits.allows(&media_type) {
            return Err(ServerError::UnsupportedMediaType(if media_type.is_empty() {
                "Unknown file type".to_string()
            } else {
                format!("File type {media_type} is not allowed")
            }));
        }

        let title = upload.title.trim();
        if title.is_empty() {
            return Err(ServerError::BadRequest("Title is required".to_string()));
        }
        let artist = upload
            .artist
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from);

        let id = SongId::generate();
        let extension = stored_extension(upload.original_filename.as_deref(), &media_type);
        let filename = format!("{}.{}", id.as_str(), extension);

        self.blobs.store(owner, &filename, &upload.bytes).await?;

        let song = Song::with_id(id, owner.clone(), title, artist, filename);
        if let Err(e) = self.songs.insert_song(&song).await {
            if let Err(cleanup) = self.blobs.delete(owner, &song.filename).await {
                tracing::warn!(
                    "Orphaned upload {} after failed insert: {}",
                    song.filename,
                    cleanup
                );
            }
            return Err(e.into());
        }

        tracing::info!(song_id = %song.id, owner = %owner, bytes = upload.bytes.len(), "Uploaded song");

        Ok(song)
    }

    /// Page through the owner's songs
    ///
    /// Missing values default to page 1 and 10 per page; the page size is
    /// capped at 100.
    pub async fn list(
        &self,
        owner: &UserId,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<SongPage> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 || limit == 0 {
            return Err(ServerError::BadRequest(
                "page and limit must be positive".to_string(),
            ));
        }
        let window = Page::new(page, limit.min(MAX_PAGE_SIZE));

        let songs = self.songs.list_songs(owner, window).await?;
        let total = self.songs.count_songs(owner).await?;

        Ok(SongPage {
            songs,
            page: window.page,
            limit: window.limit,
            total,
        })
    }

    /// Case-insensitive search over title and artist
    pub async fn search(&self, owner: &UserId, query: &str) -> Result<Vec<Song>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServerError::BadRequest(
                "Search query is required".to_string(),
            ));
        }
        Ok(self.songs.search_songs(owner, query).await?)
    }

    pub async fn get(&self, owner: &UserId, id: &SongId) -> Result<Song> {
        self.songs
            .get_song(owner, id)
            .await?
            .ok_or_else(song_not_found)
    }

    /// Change title and/or artist
    pub async fn update(&self, owner: &UserId, id: &SongId, update: UpdateSong) -> Result<Song> {
        let update = UpdateSong {
            title: match update.title {
                Some(title) if title.trim().is_empty() => {
                    return Err(ServerError::BadRequest("Title cannot be empty".to_string()));
                }
                other => other.map(|t| t.trim().to_string()),
            },
            artist: update.artist.map(|a| a.trim().to_string()),
        };

        self.songs
            .update_song(owner, id, update)
            .await?
            .ok_or_else(song_not_found)
    }

    /// Delete the song's blob and then its record
    ///
    /// A blob that cannot be removed is logged and left behind; the record
    /// is deleted regardless.
    pub async fn delete(&self, owner: &UserId, id: &SongId) -> Result<()> {
        let song = self.get(owner, id).await?;

        match self.blobs.delete(owner, &song.filename).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!("No stored file for song {}", song.id),
            Err(e) => tracing::warn!("Leaking stored file {}: {}", song.filename, e),
        }

        if !self.songs.delete_song(owner, id).await? {
            return Err(song_not_found());
        }

        tracing::info!(song_id = %id, "Deleted song");
        Ok(())
    }

    /// Open the song's stored bytes, honoring an optional `Range` header
    pub async fn open_stream(
        &self,
        owner: &UserId,
        id: &SongId,
        range_header: Option<&str>,
    ) -> Result<SongStream> {
        let song = self.get(owner, id).await?;

        let mut file = self.blobs.open(owner, &song.filename).await?;
        let file_size = file.metadata().await?.len();

        let range = match range_header {
            Some(header) => parse_range(header, file_size)?,
            None => None,
        };
        if let Some(range) = range {
            file.seek(SeekFrom::Start(range.start)).await?;
        }

        let content_type = mime_guess::from_path(&song.filename)
            .first_or_octet_stream()
            .to_string();

        Ok(SongStream {
            file,
            file_size,
            content_type,
            range,
        })
    }
}

fn song_not_found() -> ServerError {
    ServerError::NotFound("Song not found".to_string())
}

fn normalize_media_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Extension for the stored file: the client's, if it is plain, else one
/// registered for the media type
fn stored_extension(original_filename: Option<&str>, media_type: &str) -> String {
    original_filename
        .and_then(|name| std::path::Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(str::to_ascii_lowercase)
        .or_else(|| {
            mime_guess::get_mime_extensions_str(media_type)
                .and_then(|exts| exts.first())
                .map(|ext| (*ext).to_string())
        })
        .unwrap_or_else(|| "bin".to_string())
}

/// Parse a single-range `Range` header
///
/// Malformed or multi-range headers yield `Ok(None)` and the whole file is
/// served. A well-formed range that lies outside the file is an error.
pub fn parse_range(header: &str, file_size: u64) -> Result<Option<ByteRange>> {
    let Some(ranges) = header.trim().strip_prefix("bytes=") else {
        return Ok(None);
    };
    if ranges.contains(',') {
        return Ok(None);
    }
    let Some((start_str, end_str)) = ranges.split_once('-') else {
        return Ok(None);
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    let range = if start_str.is_empty() {
        // Suffix form: the last N bytes
        let Ok(suffix) = end_str.parse::<u64>() else {
            return Ok(None);
        };
        if suffix == 0 || file_size == 0 {
            return Err(ServerError::RangeNotSatisfiable(file_size));
        }
        ByteRange {
            start: file_size.saturating_sub(suffix),
            end: file_size - 1,
        }
    } else {
        let Ok(start) = start_str.parse::<u64>() else {
            return Ok(None);
        };
        let end = if end_str.is_empty() {
            None
        } else {
            match end_str.parse::<u64>() {
                Ok(end) => Some(end),
                Err(_) => return Ok(None),
            }
        };
        if let Some(end) = end {
            if end < start {
                return Ok(None);
            }
        }
        if start >= file_size {
            return Err(ServerError::RangeNotSatisfiable(file_size));
        }
        ByteRange {
            start,
            end: end.map_or(file_size - 1, |end| end.min(file_size - 1)),
        }
    };

    Ok(Some(range))
}
