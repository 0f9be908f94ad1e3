//! Playlist and membership queries
//!
//! Positions are 1-based. Appends take `MAX(position) + 1` inside the insert
//! itself, and removals or moves rewrite the remaining positions to 1..N in
//! the same transaction.

use crate::error::{timestamp, Result, StorageError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tunebox_core::types::{
    now, Playlist, PlaylistEntry, PlaylistId, PlaylistSong, Song, SongId, UpdatePlaylist, UserId,
};

const PLAYLIST_COLUMNS: &str = "id, owner_id, name, description, created_at, updated_at";

fn playlist_from_row(row: &SqliteRow) -> Result<Playlist> {
    Ok(Playlist {
        id: PlaylistId::new(row.try_get::<String, _>("id")?),
        owner_id: UserId::new(row.try_get::<String, _>("owner_id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: timestamp(row.try_get("created_at")?)?,
        updated_at: timestamp(row.try_get("updated_at")?)?,
    })
}

fn entry_from_row(row: &SqliteRow) -> Result<PlaylistEntry> {
    Ok(PlaylistEntry {
        playlist_id: PlaylistId::new(row.try_get::<String, _>("playlist_id")?),
        song_id: SongId::new(row.try_get::<String, _>("song_id")?),
        position: row.try_get::<i64, _>("position")? as u32,
        added_at: timestamp(row.try_get("added_at")?)?,
    })
}

/// Create new playlist
pub async fn insert(pool: &SqlitePool, playlist: &Playlist) -> Result<()> {
    sqlx::query(
        "INSERT INTO playlists (id, owner_id, name, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(playlist.id.as_str())
    .bind(playlist.owner_id.as_str())
    .bind(&playlist.name)
    .bind(&playlist.description)
    .bind(playlist.created_at.timestamp_millis())
    .bind(playlist.updated_at.timestamp_millis())
    .execute(pool)
    .await?;

    Ok(())
}

/// Get playlist by ID, scoped to its owner
pub async fn get_by_id(
    pool: &SqlitePool,
    owner: &UserId,
    id: &PlaylistId,
) -> Result<Option<Playlist>> {
    let sql = format!("SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE id = ? AND owner_id = ?");
    let row = sqlx::query(&sql)
        .bind(id.as_str())
        .bind(owner.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(playlist_from_row).transpose()
}

/// Get the owner's playlists, oldest first
pub async fn list_by_owner(pool: &SqlitePool, owner: &UserId) -> Result<Vec<Playlist>> {
    let sql = format!(
        "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE owner_id = ? ORDER BY created_at, id"
    );
    let rows = sqlx::query(&sql)
        .bind(owner.as_str())
        .fetch_all(pool)
        .await?;

    rows.iter().map(playlist_from_row).collect()
}

/// Update name and/or description
pub async fn update(
    pool: &SqlitePool,
    owner: &UserId,
    id: &PlaylistId,
    update: UpdatePlaylist,
) -> Result<Option<Playlist>> {
    let Some(mut playlist) = get_by_id(pool, owner, id).await? else {
        return Ok(None);
    };

    playlist.apply(&update);

    sqlx::query(
        "UPDATE playlists SET name = ?, description = ?, updated_at = ?
         WHERE id = ? AND owner_id = ?",
    )
    .bind(&playlist.name)
    .bind(&playlist.description)
    .bind(playlist.updated_at.timestamp_millis())
    .bind(id.as_str())
    .bind(owner.as_str())
    .execute(pool)
    .await?;

    Ok(Some(playlist))
}

/// Delete a playlist and all of its entries
pub async fn delete(pool: &SqlitePool, owner: &UserId, id: &PlaylistId) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let owned = sqlx::query("SELECT 1 FROM playlists WHERE id = ? AND owner_id = ?")
        .bind(id.as_str())
        .bind(owner.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .is_some();

    if !owned {
        return Ok(false);
    }

    sqlx::query("DELETE FROM playlist_entries WHERE playlist_id = ?")
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM playlists WHERE id = ? AND owner_id = ?")
        .bind(id.as_str())
        .bind(owner.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(true)
}

/// Append a song to a playlist
pub async fn add_entry(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    song_id: &SongId,
) -> Result<PlaylistEntry> {
    let added_at = now();

    let row = sqlx::query(
        r#"
        INSERT INTO playlist_entries (playlist_id, song_id, position, added_at)
        SELECT ?, ?, COALESCE(MAX(position), 0) + 1, ?
        FROM playlist_entries
        WHERE playlist_id = ?
        RETURNING position
        "#,
    )
    .bind(playlist_id.as_str())
    .bind(song_id.as_str())
    .bind(added_at.timestamp_millis())
    .bind(playlist_id.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| StorageError::unique_as_duplicate(e, "song is already in the playlist"))?;

    let position = row.try_get::<i64, _>("position")? as u32;

    touch(pool, playlist_id).await?;

    Ok(PlaylistEntry {
        playlist_id: playlist_id.clone(),
        song_id: song_id.clone(),
        position,
        added_at,
    })
}

/// Remove a song from a playlist, closing the gap
pub async fn remove_entry(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    song_id: &SongId,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM playlist_entries WHERE playlist_id = ? AND song_id = ?")
        .bind(playlist_id.as_str())
        .bind(song_id.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected()
        > 0;

    if removed {
        close_gaps(&mut tx, playlist_id).await?;
    }

    tx.commit().await?;

    Ok(removed)
}

/// Move a member song to a new 1-based position
///
/// Positions beyond the end are clamped to the last slot.
pub async fn move_entry(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    song_id: &SongId,
    position: u32,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let mut order = ordered_song_ids(&mut tx, playlist_id).await?;
    let Some(current) = order.iter().position(|id| id == song_id.as_str()) else {
        return Ok(false);
    };

    let moved = order.remove(current);
    let target = (position.max(1) as usize - 1).min(order.len());
    order.insert(target, moved);

    renumber(&mut tx, playlist_id, &order).await?;
    touch(&mut *tx, playlist_id).await?;

    tx.commit().await?;

    Ok(true)
}

/// Get raw membership entries ordered by position
pub async fn get_entries(pool: &SqlitePool, playlist_id: &PlaylistId) -> Result<Vec<PlaylistEntry>> {
    let rows = sqlx::query(
        "SELECT playlist_id, song_id, position, added_at FROM playlist_entries
         WHERE playlist_id = ? ORDER BY position",
    )
    .bind(playlist_id.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter().map(entry_from_row).collect()
}

/// Get member songs ordered by position
///
/// The inner join drops entries whose song no longer exists.
pub async fn get_songs(pool: &SqlitePool, playlist_id: &PlaylistId) -> Result<Vec<PlaylistSong>> {
    let rows = sqlx::query(
        r#"
        SELECT pe.position,
               s.id, s.owner_id, s.title, s.artist, s.filename, s.created_at, s.updated_at
        FROM playlist_entries pe
        INNER JOIN songs s ON s.id = pe.song_id
        WHERE pe.playlist_id = ?
        ORDER BY pe.position
        "#,
    )
    .bind(playlist_id.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(PlaylistSong {
                position: row.try_get::<i64, _>("position")? as u32,
                song: Song {
                    id: SongId::new(row.try_get::<String, _>("id")?),
                    owner_id: UserId::new(row.try_get::<String, _>("owner_id")?),
                    title: row.try_get("title")?,
                    artist: row.try_get("artist")?,
                    filename: row.try_get("filename")?,
                    created_at: timestamp(row.try_get("created_at")?)?,
                    updated_at: timestamp(row.try_get("updated_at")?)?,
                },
            })
        })
        .collect()
}

// Helper functions

/// Renumber a playlist's remaining entries to 1..N after a removal
pub(crate) async fn close_gaps(conn: &mut SqliteConnection, playlist_id: &PlaylistId) -> Result<()> {
    let order = ordered_song_ids(conn, playlist_id).await?;
    renumber(conn, playlist_id, &order).await?;
    touch(&mut *conn, playlist_id).await
}

async fn ordered_song_ids(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT song_id FROM playlist_entries WHERE playlist_id = ? ORDER BY position, added_at",
    )
    .bind(playlist_id.as_str())
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| row.try_get::<String, _>("song_id").map_err(StorageError::from))
        .collect()
}

async fn renumber(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    order: &[String],
) -> Result<()> {
    for (index, song_id) in order.iter().enumerate() {
        sqlx::query("UPDATE playlist_entries SET position = ? WHERE playlist_id = ? AND song_id = ?")
            .bind(index as i64 + 1)
            .bind(playlist_id.as_str())
            .bind(song_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn touch<'e, E>(executor: E, playlist_id: &PlaylistId) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
        .bind(now().timestamp_millis())
        .bind(playlist_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}
