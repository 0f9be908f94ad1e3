//! Song metadata queries
//!
//! Every query is filtered by `owner_id`; a song owned by someone else is
//! simply not found.

use crate::error::{timestamp, Result};
use crate::playlists;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tunebox_core::types::{Page, PlaylistId, Song, SongId, UpdateSong, UserId};

const SONG_COLUMNS: &str = "id, owner_id, title, artist, filename, created_at, updated_at";

fn song_from_row(row: &SqliteRow) -> Result<Song> {
    Ok(Song {
        id: SongId::new(row.try_get::<String, _>("id")?),
        owner_id: UserId::new(row.try_get::<String, _>("owner_id")?),
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        filename: row.try_get("filename")?,
        created_at: timestamp(row.try_get("created_at")?)?,
        updated_at: timestamp(row.try_get("updated_at")?)?,
    })
}

/// Case-folded title and artist for the search columns
///
/// SQLite's `lower()` only folds ASCII, so folding happens here.
fn search_keys(song: &Song) -> (String, String) {
    (
        song.title.to_lowercase(),
        song.artist.as_deref().unwrap_or_default().to_lowercase(),
    )
}

/// Insert a song record
pub async fn insert(pool: &SqlitePool, song: &Song) -> Result<()> {
    let (title_search, artist_search) = search_keys(song);

    sqlx::query(
        "INSERT INTO songs (id, owner_id, title, artist, filename, title_search, artist_search,
                            created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(song.id.as_str())
    .bind(song.owner_id.as_str())
    .bind(&song.title)
    .bind(&song.artist)
    .bind(&song.filename)
    .bind(title_search)
    .bind(artist_search)
    .bind(song.created_at.timestamp_millis())
    .bind(song.updated_at.timestamp_millis())
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a song by ID, scoped to its owner
pub async fn get_by_id(pool: &SqlitePool, owner: &UserId, id: &SongId) -> Result<Option<Song>> {
    let sql = format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ? AND owner_id = ?");
    let row = sqlx::query(&sql)
        .bind(id.as_str())
        .bind(owner.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(song_from_row).transpose()
}

/// Page through an owner's songs
pub async fn list_by_owner(pool: &SqlitePool, owner: &UserId, page: Page) -> Result<Vec<Song>> {
    let sql = format!(
        "SELECT {SONG_COLUMNS} FROM songs WHERE owner_id = ?
         ORDER BY created_at, id LIMIT ? OFFSET ?"
    );
    let rows = sqlx::query(&sql)
        .bind(owner.as_str())
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(pool)
        .await?;

    rows.iter().map(song_from_row).collect()
}

/// Count an owner's songs
pub async fn count_by_owner(pool: &SqlitePool, owner: &UserId) -> Result<u64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM songs WHERE owner_id = ?")
        .bind(owner.as_str())
        .fetch_one(pool)
        .await?;

    Ok(row.try_get::<i64, _>("count")? as u64)
}

/// Search an owner's songs by title or artist
///
/// Case-insensitive substring match against the folded search columns.
/// `instr` is used instead of `LIKE` so `%` and `_` in the query match
/// literally.
pub async fn search(pool: &SqlitePool, owner: &UserId, query: &str) -> Result<Vec<Song>> {
    let needle = query.to_lowercase();
    let sql = format!(
        "SELECT {SONG_COLUMNS} FROM songs
         WHERE owner_id = ?
           AND (instr(title_search, ?) > 0 OR instr(artist_search, ?) > 0)
         ORDER BY created_at, id"
    );
    let rows = sqlx::query(&sql)
        .bind(owner.as_str())
        .bind(&needle)
        .bind(&needle)
        .fetch_all(pool)
        .await?;

    rows.iter().map(song_from_row).collect()
}

/// Update title and/or artist
pub async fn update(
    pool: &SqlitePool,
    owner: &UserId,
    id: &SongId,
    update: UpdateSong,
) -> Result<Option<Song>> {
    let Some(mut song) = get_by_id(pool, owner, id).await? else {
        return Ok(None);
    };

    song.apply(&update);
    let (title_search, artist_search) = search_keys(&song);

    sqlx::query(
        "UPDATE songs SET title = ?, artist = ?, title_search = ?, artist_search = ?,
                          updated_at = ?
         WHERE id = ? AND owner_id = ?",
    )
    .bind(&song.title)
    .bind(&song.artist)
    .bind(title_search)
    .bind(artist_search)
    .bind(song.updated_at.timestamp_millis())
    .bind(id.as_str())
    .bind(owner.as_str())
    .execute(pool)
    .await?;

    Ok(Some(song))
}

/// Delete a song record along with its playlist memberships
///
/// Every playlist that held the song is renumbered in the same transaction.
pub async fn delete(pool: &SqlitePool, owner: &UserId, id: &SongId) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let owned = sqlx::query("SELECT 1 FROM songs WHERE id = ? AND owner_id = ?")
        .bind(id.as_str())
        .bind(owner.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .is_some();

    if !owned {
        return Ok(false);
    }

    let playlist_ids = sqlx::query(
        "SELECT DISTINCT playlist_id FROM playlist_entries WHERE song_id = ? ORDER BY playlist_id",
    )
    .bind(id.as_str())
    .fetch_all(&mut *tx)
    .await?
    .iter()
    .map(|row| row.try_get::<String, _>("playlist_id").map(PlaylistId::new))
    .collect::<std::result::Result<Vec<_>, _>>()?;

    sqlx::query("DELETE FROM playlist_entries WHERE song_id = ?")
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM songs WHERE id = ? AND owner_id = ?")
        .bind(id.as_str())
        .bind(owner.as_str())
        .execute(&mut *tx)
        .await?;

    for playlist_id in &playlist_ids {
        playlists::close_gaps(&mut tx, playlist_id).await?;
    }

    tx.commit().await?;

    Ok(true)
}
