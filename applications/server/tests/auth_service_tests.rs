/// Authentication service tests
/// Tests registration, sign-in, JWT generation and token validation
mod common;

use common::create_test_auth_service;
use tunebox_core::{UserId, UserStore};
use tunebox_server::{
    services::auth::{Registration, TokenType},
    ServerError,
};
use tunebox_storage::MemoryStore;

fn registration(username: &str, email: &str, password: &str) -> Registration {
    Registration {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

/// Test password hashing produces valid bcrypt hashes
#[tokio::test]
async fn test_password_hashing() {
    let auth_service = create_test_auth_service();

    let password = "MySecurePassword123!";
    let hash = auth_service.hash_password(password).unwrap();

    assert!(hash.starts_with("$2b$") || hash.starts_with("$2a$"));

    // Salted, so hashing twice differs
    let hash2 = auth_service.hash_password(password).unwrap();
    assert_ne!(hash, hash2);

    assert!(auth_service.verify_password(password, &hash).unwrap());
    assert!(!auth_service.verify_password("WrongPassword", &hash).unwrap());
}

#[tokio::test]
async fn test_register_stores_hash_not_password() {
    let auth_service = create_test_auth_service();
    let store = MemoryStore::new();

    let user = auth_service
        .register(&store, registration("  alice ", "alice@x.com", "pw1"))
        .await
        .unwrap();
    assert_eq!(user.username, "alice");

    let credentials = store
        .find_credentials_by_email("alice@x.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(credentials.password_hash, "pw1");
    assert!(auth_service
        .verify_password("pw1", &credentials.password_hash)
        .unwrap());
}

#[tokio::test]
async fn test_register_rejects_taken_username_or_email() {
    let auth_service = create_test_auth_service();
    let store = MemoryStore::new();

    auth_service
        .register(&store, registration("alice", "alice@x.com", "pw1"))
        .await
        .unwrap();

    let same_email = auth_service
        .register(&store, registration("alice2", "alice@x.com", "pw2"))
        .await;
    assert!(matches!(same_email, Err(ServerError::Conflict(_))));

    let same_name = auth_service
        .register(&store, registration("alice", "other@x.com", "pw2"))
        .await;
    assert!(matches!(same_name, Err(ServerError::Conflict(_))));

    assert_eq!(store.get_all_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_validation() {
    let auth_service = create_test_auth_service();
    let store = MemoryStore::new();

    for bad in [
        registration("ab", "a@x.com", "pw"),
        registration(&"x".repeat(33), "a@x.com", "pw"),
        registration("alice", "a.x.com", "pw"),
        registration("alice", "a@x.com", ""),
    ] {
        let result = auth_service.register(&store, bad).await;
        assert!(matches!(result, Err(ServerError::BadRequest(_))));
    }
    assert!(store.get_all_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_authenticate() {
    let auth_service = create_test_auth_service();
    let store = MemoryStore::new();
    let user = auth_service
        .register(&store, registration("alice", "alice@x.com", "pw1"))
        .await
        .unwrap();

    let tokens = auth_service
        .authenticate(&store, "alice@x.com", "pw1")
        .await
        .unwrap();
    assert_eq!(tokens.token_type, "Bearer");
    assert_eq!(tokens.expires_in, 3600);
    assert_eq!(auth_service.validate_token(&tokens.access_token).unwrap(), user.id);

    let wrong = auth_service
        .authenticate(&store, "alice@x.com", "nope")
        .await
        .unwrap_err();
    let unknown = auth_service
        .authenticate(&store, "ghost@x.com", "pw1")
        .await
        .unwrap_err();
    assert!(matches!(wrong, ServerError::Auth(_)));
    assert_eq!(wrong.to_string(), unknown.to_string());
}

/// Test token claims carry the user and type
#[test]
fn test_token_claims() {
    let auth_service = create_test_auth_service();
    let user_id = UserId::generate();

    let access = auth_service.create_access_token(&user_id).unwrap();
    let claims = auth_service.verify_token(&access).unwrap();
    assert_eq!(claims.sub, user_id.as_str());
    assert_eq!(claims.token_type, TokenType::Access);
    assert!(claims.exp > claims.iat);

    let refresh = auth_service.create_refresh_token(&user_id).unwrap();
    let claims = auth_service.verify_token(&refresh).unwrap();
    assert_eq!(claims.token_type, TokenType::Refresh);
}

#[test]
fn test_token_types_are_not_interchangeable() {
    let auth_service = create_test_auth_service();
    let user_id = UserId::generate();

    let access = auth_service.create_access_token(&user_id).unwrap();
    let refresh = auth_service.create_refresh_token(&user_id).unwrap();

    assert!(auth_service.validate_token(&refresh).is_err());
    assert!(auth_service.refresh(&access).is_err());

    let new_access = auth_service.refresh(&refresh).unwrap();
    assert_eq!(auth_service.validate_token(&new_access).unwrap(), user_id);
}

#[test]
fn test_token_rejected_with_other_secret() {
    let auth_service = create_test_auth_service();
    let other = tunebox_server::AuthService::new("another-secret".to_string(), 1, 1, 4);

    let token = other.create_access_token(&UserId::generate()).unwrap();
    assert!(matches!(
        auth_service.validate_token(&token),
        Err(ServerError::Jwt(_))
    ));
    assert!(auth_service.validate_token("not.a.jwt").is_err());
}
