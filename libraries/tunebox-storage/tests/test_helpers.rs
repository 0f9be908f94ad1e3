//! Test helpers and fixtures for storage integration tests
//!
//! These helpers create test databases using REAL SQLite files (NOT in-memory)
//! to match production behavior and properly test migrations, constraints, and indexes.

#![allow(dead_code)]

use sqlx::SqlitePool;
use tempfile::TempDir;
use tunebox_core::types::*;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let pool = tunebox_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");

        tunebox_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Test fixture: Create a test user
pub async fn create_test_user(pool: &SqlitePool, username: &str) -> UserId {
    tunebox_storage::users::create(
        pool,
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
        },
    )
    .await
    .expect("Failed to create test user")
    .id
}

/// Test fixture: Create a song owned by `owner`
pub async fn create_test_song(
    pool: &SqlitePool,
    owner: &UserId,
    title: &str,
    artist: Option<&str>,
) -> Song {
    let song = Song::new(
        owner.clone(),
        title,
        artist.map(str::to_string),
        format!("{title}.mp3"),
    );
    tunebox_storage::songs::insert(pool, &song)
        .await
        .expect("Failed to create test song");
    song
}

/// Test fixture: Create a playlist owned by `owner`
pub async fn create_test_playlist(pool: &SqlitePool, owner: &UserId, name: &str) -> Playlist {
    let playlist = Playlist::new(owner.clone(), name, None);
    tunebox_storage::playlists::insert(pool, &playlist)
        .await
        .expect("Failed to create test playlist");
    playlist
}
