//! Integration tests for the users vertical slice

mod test_helpers;

use test_helpers::*;
use tunebox_core::types::*;
use tunebox_storage::StorageError;

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$2b$04$hash".to_string(),
    }
}

#[tokio::test]
async fn test_create_user_stores_credentials() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = tunebox_storage::users::create(pool, new_user("alice", "alice@x.com"))
        .await
        .expect("Failed to create user");

    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@x.com");

    let stored = tunebox_storage::users::find_credentials_by_email(pool, "alice@x.com")
        .await
        .unwrap()
        .expect("credentials should exist");
    assert_eq!(stored.user, user);
    assert_eq!(stored.password_hash, "$2b$04$hash");
}

#[tokio::test]
async fn test_duplicate_email_or_username_rejected() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    tunebox_storage::users::create(pool, new_user("alice", "alice@x.com"))
        .await
        .unwrap();

    let same_email = tunebox_storage::users::create(pool, new_user("alice2", "alice@x.com")).await;
    assert!(matches!(same_email, Err(StorageError::Duplicate(_))));

    let same_name = tunebox_storage::users::create(pool, new_user("alice", "other@x.com")).await;
    assert!(matches!(same_name, Err(StorageError::Duplicate(_))));

    // Failed registrations leave nothing behind
    let users = tunebox_storage::users::get_all(pool).await.unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_find_credentials_by_email() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = tunebox_storage::users::create(pool, new_user("bob", "bob@x.com"))
        .await
        .unwrap();

    let creds = tunebox_storage::users::find_credentials_by_email(pool, "bob@x.com")
        .await
        .unwrap()
        .expect("credentials should exist");
    assert_eq!(creds.user.id, user.id);
    assert_eq!(creds.password_hash, "$2b$04$hash");

    let missing = tunebox_storage::users::find_credentials_by_email(pool, "nobody@x.com")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_username_or_email_taken() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    create_test_user(pool, "carol").await;

    let taken = |u: &'static str, e: &'static str| async move {
        tunebox_storage::users::username_or_email_taken(pool, u, e)
            .await
            .unwrap()
    };

    assert!(taken("carol", "fresh@x.com").await);
    assert!(taken("fresh", "carol@example.com").await);
    assert!(!taken("fresh", "fresh@x.com").await);
}

#[tokio::test]
async fn test_get_all_users_sorted_by_username() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    create_test_user(pool, "zed").await;
    create_test_user(pool, "amy").await;

    let names: Vec<String> = tunebox_storage::users::get_all(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, vec!["amy", "zed"]);
}
