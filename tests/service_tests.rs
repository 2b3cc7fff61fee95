//! Tests for the account service over the in-memory repository.
//!
//! Tests cover:
//! - Registration and duplicate detection
//! - Credential verification with uniform failures
//! - Token pair issuance and refresh rotation
//! - Blocking service parity with the async service

use std::sync::Arc;

use authkit::blocking;
use authkit::{
    AuthError, AuthService, MemoryRepository, Settings, decode_access, decode_refresh,
};

fn settings() -> Arc<Settings> {
    Arc::new(Settings::new(b"service-test-secret".to_vec()))
}

fn new_service() -> AuthService<MemoryRepository> {
    AuthService::new(settings(), MemoryRepository::new())
}

fn new_blocking_service() -> blocking::AuthService<MemoryRepository> {
    blocking::AuthService::new(settings(), MemoryRepository::new())
}

// =============================================================================
// Registration Tests
// =============================================================================

#[tokio::test]
async fn test_create_user_defaults() {
    let service = new_service();

    let user = service
        .create_user("a@example.com", "alice", "pw123456")
        .await
        .unwrap();

    assert_eq!(user.id, 1);
    assert_eq!(user.email, "a@example.com");
    assert_eq!(user.username, "alice");
    assert!(user.is_active);
    assert!(!user.is_staff);
    assert!(!user.is_superuser);
    assert_ne!(user.password_hash, "pw123456");
}

#[tokio::test]
async fn test_create_superuser_sets_flags() {
    let service = new_service();

    let user = service
        .create_superuser("root@example.com", "root", "pw123456")
        .await
        .unwrap();

    assert!(user.is_active);
    assert!(user.is_staff);
    assert!(user.is_superuser);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let service = new_service();
    service
        .create_user("a@example.com", "alice", "pw123456")
        .await
        .unwrap();

    let err = service
        .create_user("a@example.com", "other", "pw123456")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AuthError::conflict("User with this email or username already exists")
    );
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let service = new_service();
    service
        .create_user("a@example.com", "alice", "pw123456")
        .await
        .unwrap();

    let err = service
        .create_user("other@example.com", "alice", "pw123456")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Conflict(_)));
}

#[tokio::test]
async fn test_cross_column_collision_conflicts() {
    // A username equal to an existing email is taken too; the lookup
    // matches either column.
    let service = new_service();
    service
        .create_user("a@example.com", "alice", "pw123456")
        .await
        .unwrap();

    let err = service
        .create_user("b@example.com", "a@example.com", "pw123456")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Conflict(_)));
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_authenticate_by_username_and_email() {
    let service = new_service();
    service
        .create_user("a@example.com", "alice", "pw123456")
        .await
        .unwrap();

    let by_username = service.authenticate("alice", "pw123456").await.unwrap();
    assert_eq!(by_username.id, 1);

    let by_email = service
        .authenticate("a@example.com", "pw123456")
        .await
        .unwrap();
    assert_eq!(by_email.id, 1);
}

#[tokio::test]
async fn test_authenticate_failures_are_uniform() {
    let service = new_service();
    service
        .create_user("a@example.com", "alice", "pw123456")
        .await
        .unwrap();

    let wrong_password = service.authenticate("alice", "nope").await.unwrap_err();
    let unknown_user = service.authenticate("nobody", "pw123456").await.unwrap_err();

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password, AuthError::unauthorized("Invalid credentials"));
}

// =============================================================================
// Token Pair Tests
// =============================================================================

#[tokio::test]
async fn test_assign_token_pair() {
    let service = new_service();
    let user = service
        .create_user("a@example.com", "alice", "pw123456")
        .await
        .unwrap();

    let pair = service.assign_token(&user).unwrap();

    let access = decode_access(service.settings(), &pair.access).unwrap();
    assert_eq!(access.sub, user.id.to_string());
    assert!(access.jti.is_none());

    let refresh = decode_refresh(service.settings(), pair.refresh.as_deref().unwrap()).unwrap();
    assert_eq!(refresh.sub, user.id.to_string());

    let jti = refresh.jti.unwrap();
    assert_eq!(jti.len(), 32);
    assert!(jti.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_assign_token_fresh_jti_per_call() {
    let service = new_service();
    let user = service
        .create_user("a@example.com", "alice", "pw123456")
        .await
        .unwrap();

    let first = service.assign_token(&user).unwrap();
    let second = service.assign_token(&user).unwrap();

    let jti1 = decode_refresh(service.settings(), first.refresh.as_deref().unwrap())
        .unwrap()
        .jti;
    let jti2 = decode_refresh(service.settings(), second.refresh.as_deref().unwrap())
        .unwrap()
        .jti;

    assert_ne!(jti1, jti2);
}

#[tokio::test]
async fn test_refresh_rotates_by_default() {
    let service = new_service();
    let user = service
        .create_user("a@example.com", "alice", "pw123456")
        .await
        .unwrap();

    let pair = service.assign_token(&user).unwrap();
    let old_refresh = pair.refresh.unwrap();

    let rotated = service.refresh_pair(&old_refresh).unwrap();
    let new_refresh = rotated.refresh.expect("rotation is on by default");

    let old_jti = decode_refresh(service.settings(), &old_refresh).unwrap().jti;
    let new_jti = decode_refresh(service.settings(), &new_refresh).unwrap().jti;
    assert_ne!(old_jti, new_jti);

    // The new access token is for the same subject.
    let access = decode_access(service.settings(), &rotated.access).unwrap();
    assert_eq!(access.sub, user.id.to_string());
}

#[tokio::test]
async fn test_refresh_without_rotation_keeps_token() {
    let settings = Arc::new(
        Settings::builder(b"service-test-secret".to_vec())
            .with_refresh_rotation(false)
            .build(),
    );
    let service = AuthService::new(settings, MemoryRepository::new());

    let user = service
        .create_user("a@example.com", "alice", "pw123456")
        .await
        .unwrap();
    let pair = service.assign_token(&user).unwrap();

    let rotated = service.refresh_pair(pair.refresh.as_deref().unwrap()).unwrap();
    assert!(rotated.refresh.is_none());
    assert!(decode_access(service.settings(), &rotated.access).is_ok());
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let service = new_service();
    let user = service
        .create_user("a@example.com", "alice", "pw123456")
        .await
        .unwrap();

    let pair = service.assign_token(&user).unwrap();
    let err = service.refresh_pair(&pair.access).unwrap_err();

    assert_eq!(err, AuthError::unauthorized("Invalid refresh token"));
}

#[tokio::test]
async fn test_refresh_rejects_garbage() {
    let service = new_service();

    let err = service.refresh_pair("not-a-token").unwrap_err();
    assert_eq!(err, AuthError::unauthorized("Invalid refresh token"));
}

// =============================================================================
// Blocking Parity Tests
// =============================================================================

#[test]
fn test_blocking_register_and_authenticate() {
    let service = new_blocking_service();

    let user = service.create_user("a@example.com", "alice", "pw123456").unwrap();
    assert_eq!(user.id, 1);
    assert!(user.is_active);

    let err = service
        .create_user("a@example.com", "other", "pw123456")
        .unwrap_err();
    assert!(matches!(err, AuthError::Conflict(_)));

    let authed = service.authenticate("alice", "pw123456").unwrap();
    assert_eq!(authed.id, user.id);

    let err = service.authenticate("alice", "nope").unwrap_err();
    assert_eq!(err, AuthError::unauthorized("Invalid credentials"));
}

#[test]
fn test_blocking_superuser_flags() {
    let service = new_blocking_service();

    let user = service
        .create_superuser("root@example.com", "root", "pw123456")
        .unwrap();
    assert!(user.is_staff);
    assert!(user.is_superuser);
}

#[test]
fn test_blocking_token_flow() {
    let service = new_blocking_service();
    let user = service.create_user("a@example.com", "alice", "pw123456").unwrap();

    let pair = service.assign_token(&user).unwrap();
    let refresh = pair.refresh.expect("login always issues a refresh token");

    let rotated = service.refresh_pair(&refresh).unwrap();
    assert!(rotated.refresh.is_some());

    let access = decode_access(service.settings(), &rotated.access).unwrap();
    assert_eq!(access.sub, user.id.to_string());
}
