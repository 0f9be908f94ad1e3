//! Integration tests for the playlists vertical slice
//!
//! Tests playlist operations including:
//! - CRUD scoped to the owner
//! - Position assignment on append
//! - Renumbering after removal and moves
//! - Transaction correctness for playlist and song deletion

mod test_helpers;

use test_helpers::*;
use tunebox_core::types::*;
use tunebox_storage::StorageError;

async fn positions(pool: &sqlx::SqlitePool, playlist: &PlaylistId) -> Vec<(String, u32)> {
    tunebox_storage::playlists::get_entries(pool, playlist)
        .await
        .unwrap()
        .into_iter()
        .map(|e| (e.song_id.to_string(), e.position))
        .collect()
}

#[tokio::test]
async fn test_create_and_get_playlist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user_id = create_test_user(pool, "testuser").await;

    let playlist = Playlist::new(
        user_id.clone(),
        "My Favorites",
        Some("Best songs ever".to_string()),
    );
    tunebox_storage::playlists::insert(pool, &playlist)
        .await
        .expect("Failed to create playlist");

    let retrieved = tunebox_storage::playlists::get_by_id(pool, &user_id, &playlist.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(retrieved, playlist);
}

#[tokio::test]
async fn test_get_user_playlists() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user1 = create_test_user(pool, "user1").await;
    let user2 = create_test_user(pool, "user2").await;

    create_test_playlist(pool, &user1, "User 1 Playlist A").await;
    create_test_playlist(pool, &user1, "User 1 Playlist B").await;
    let other = create_test_playlist(pool, &user2, "User 2 Playlist").await;

    let user1_playlists = tunebox_storage::playlists::list_by_owner(pool, &user1)
        .await
        .unwrap();

    assert_eq!(user1_playlists.len(), 2);
    for playlist in &user1_playlists {
        assert_eq!(playlist.owner_id, user1);
    }

    // Not visible through the wrong owner
    let hidden = tunebox_storage::playlists::get_by_id(pool, &user1, &other.id)
        .await
        .unwrap();
    assert!(hidden.is_none());
}

#[tokio::test]
async fn test_add_songs_assigns_sequential_positions() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user_id = create_test_user(pool, "testuser").await;
    let playlist = create_test_playlist(pool, &user_id, "Queue").await;

    let mut expected = Vec::new();
    for title in ["one", "two", "three"] {
        let song = create_test_song(pool, &user_id, title, None).await;
        let entry = tunebox_storage::playlists::add_entry(pool, &playlist.id, &song.id)
            .await
            .unwrap();
        expected.push(song.title);
        assert_eq!(entry.position as usize, expected.len());
    }

    let songs = tunebox_storage::playlists::get_songs(pool, &playlist.id)
        .await
        .unwrap();
    let titles: Vec<String> = songs.iter().map(|s| s.song.title.clone()).collect();
    let order: Vec<u32> = songs.iter().map(|s| s.position).collect();

    assert_eq!(titles, expected);
    assert_eq!(order, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_add_duplicate_song_fails() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user_id = create_test_user(pool, "testuser").await;
    let playlist = create_test_playlist(pool, &user_id, "Queue").await;
    let song = create_test_song(pool, &user_id, "again", None).await;

    tunebox_storage::playlists::add_entry(pool, &playlist.id, &song.id)
        .await
        .unwrap();
    let second = tunebox_storage::playlists::add_entry(pool, &playlist.id, &song.id).await;

    assert!(matches!(second, Err(StorageError::Duplicate(_))));
    assert_eq!(positions(pool, &playlist.id).await.len(), 1);
}

#[tokio::test]
async fn test_remove_song_renumbers_remaining_entries() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user_id = create_test_user(pool, "testuser").await;
    let playlist = create_test_playlist(pool, &user_id, "Queue").await;

    let mut ids = Vec::new();
    for title in ["a", "b", "c", "d"] {
        let song = create_test_song(pool, &user_id, title, None).await;
        tunebox_storage::playlists::add_entry(pool, &playlist.id, &song.id)
            .await
            .unwrap();
        ids.push(song.id);
    }

    let removed = tunebox_storage::playlists::remove_entry(pool, &playlist.id, &ids[1])
        .await
        .unwrap();
    assert!(removed);

    assert_eq!(
        positions(pool, &playlist.id).await,
        vec![
            (ids[0].to_string(), 1),
            (ids[2].to_string(), 2),
            (ids[3].to_string(), 3),
        ]
    );

    // Appending after a removal continues from the new maximum
    let tail = create_test_song(pool, &user_id, "e", None).await;
    let entry = tunebox_storage::playlists::add_entry(pool, &playlist.id, &tail.id)
        .await
        .unwrap();
    assert_eq!(entry.position, 4);
}

#[tokio::test]
async fn test_remove_non_member_is_noop() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user_id = create_test_user(pool, "testuser").await;
    let playlist = create_test_playlist(pool, &user_id, "Queue").await;
    let member = create_test_song(pool, &user_id, "member", None).await;
    let outsider = create_test_song(pool, &user_id, "outsider", None).await;

    tunebox_storage::playlists::add_entry(pool, &playlist.id, &member.id)
        .await
        .unwrap();

    let removed = tunebox_storage::playlists::remove_entry(pool, &playlist.id, &outsider.id)
        .await
        .unwrap();

    assert!(!removed);
    assert_eq!(positions(pool, &playlist.id).await.len(), 1);
}

#[tokio::test]
async fn test_move_song_shifts_others() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user_id = create_test_user(pool, "testuser").await;
    let playlist = create_test_playlist(pool, &user_id, "Queue").await;

    let mut ids = Vec::new();
    for title in ["a", "b", "c"] {
        let song = create_test_song(pool, &user_id, title, None).await;
        tunebox_storage::playlists::add_entry(pool, &playlist.id, &song.id)
            .await
            .unwrap();
        ids.push(song.id);
    }

    // Move last to first
    assert!(
        tunebox_storage::playlists::move_entry(pool, &playlist.id, &ids[2], 1)
            .await
            .unwrap()
    );
    assert_eq!(
        positions(pool, &playlist.id).await,
        vec![
            (ids[2].to_string(), 1),
            (ids[0].to_string(), 2),
            (ids[1].to_string(), 3),
        ]
    );

    // Non-member cannot be moved
    let stranger = create_test_song(pool, &user_id, "x", None).await;
    assert!(
        !tunebox_storage::playlists::move_entry(pool, &playlist.id, &stranger.id, 1)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_delete_playlist_removes_entries() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user_id = create_test_user(pool, "testuser").await;
    let other = create_test_user(pool, "other").await;
    let playlist = create_test_playlist(pool, &user_id, "Doomed").await;
    let song = create_test_song(pool, &user_id, "s", None).await;

    tunebox_storage::playlists::add_entry(pool, &playlist.id, &song.id)
        .await
        .unwrap();

    // Wrong owner cannot delete
    assert!(
        !tunebox_storage::playlists::delete(pool, &other, &playlist.id)
            .await
            .unwrap()
    );
    assert_eq!(positions(pool, &playlist.id).await.len(), 1);

    assert!(
        tunebox_storage::playlists::delete(pool, &user_id, &playlist.id)
            .await
            .unwrap()
    );

    let gone = tunebox_storage::playlists::get_by_id(pool, &user_id, &playlist.id)
        .await
        .unwrap();
    assert!(gone.is_none());
    assert!(positions(pool, &playlist.id).await.is_empty());

    // The song itself survives
    assert!(tunebox_storage::songs::get_by_id(pool, &user_id, &song.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_delete_song_renumbers_playlists_containing_it() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user_id = create_test_user(pool, "testuser").await;
    let playlist = create_test_playlist(pool, &user_id, "Queue").await;

    let mut ids = Vec::new();
    for title in ["a", "b", "c"] {
        let song = create_test_song(pool, &user_id, title, None).await;
        tunebox_storage::playlists::add_entry(pool, &playlist.id, &song.id)
            .await
            .unwrap();
        ids.push(song.id);
    }

    assert!(tunebox_storage::songs::delete(pool, &user_id, &ids[1])
        .await
        .unwrap());

    assert_eq!(
        positions(pool, &playlist.id).await,
        vec![(ids[0].to_string(), 1), (ids[2].to_string(), 2)]
    );
}

#[tokio::test]
async fn test_update_playlist_keeps_unset_fields() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user_id = create_test_user(pool, "testuser").await;
    let playlist = Playlist::new(user_id.clone(), "Before", Some("desc".to_string()));
    tunebox_storage::playlists::insert(pool, &playlist)
        .await
        .unwrap();

    let updated = tunebox_storage::playlists::update(
        pool,
        &user_id,
        &playlist.id,
        UpdatePlaylist {
            name: Some("After".to_string()),
            description: None,
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.name, "After");
    assert_eq!(updated.description.as_deref(), Some("desc"));

    let stored = tunebox_storage::playlists::get_by_id(pool, &user_id, &playlist.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, updated);
}
