//! Integration tests for key management and the public-key boundary.

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;

use keyward_core::config::CryptoConfig;
use keyward_crypto::{KeyGenerationRequest, KeyManager};
use keyward_database::MemoryKeyPairRepository;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_2048_bit_round_trip_records_usage() {
    let km = KeyManager::new(
        Arc::new(MemoryKeyPairRepository::new()),
        CryptoConfig::default(),
    );
    let key = km
        .generate_key_pair(KeyGenerationRequest::active("integration").with_key_size(2048))
        .await
        .unwrap();
    assert_eq!(key.key_size, 2048);

    let ciphertext =
        keyward_crypto::rsa::encrypt_with_public_key(&key.public_key, "hello@example.com")
            .unwrap();
    let plaintext = km.decrypt(&key.key_id, &ciphertext).await.unwrap();
    assert_eq!(plaintext, "hello@example.com");

    let info = km.find_key(&key.key_id).await.unwrap();
    assert_eq!(info.key_id, key.key_id);
    let stored = km.get_active_key().await.unwrap();
    assert_eq!(stored.usage_count, 1);
    assert!(stored.last_used_time.is_some());
}

#[tokio::test]
async fn test_public_key_endpoint_is_stable() {
    let app = helpers::TestApp::new().await;

    let first = app.request("GET", "/api/crypto/public-key", None, None).await;
    let second = app.request("GET", "/api/crypto/public-key", None, None).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["data"]["keyId"], second.body["data"]["keyId"]);
    assert_eq!(first.body["data"]["algorithm"], "RSA");
    assert!(first.body["data"].get("privateKey").is_none());
}

#[tokio::test]
async fn test_key_admin_requires_admin_role() {
    let app = helpers::TestApp::new().await;
    app.create_user(10, "root", "Root-pass-123", &["admin"]).await;
    app.create_user(11, "user", "User-pass-123", &["user"]).await;
    let admin = app.login("root", "Root-pass-123").await;
    let user = app.login("user", "User-pass-123").await;

    let anonymous = app.request("GET", "/api/crypto/keys", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forbidden = app.request("GET", "/api/crypto/keys", None, Some(&user)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let listed = app.request("GET", "/api/crypto/keys", None, Some(&admin)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rotation_keeps_old_key_decryptable() {
    let app = helpers::TestApp::new().await;
    app.create_user(12, "root", "Root-pass-123", &["admin"]).await;
    let admin = app.login("root", "Root-pass-123").await;

    let (old_key_id, old_ciphertext) = app.encrypt_for_server("before rotation").await;

    let rotated = app
        .request("POST", "/api/crypto/keys/rotate", None, Some(&admin))
        .await;
    assert_eq!(rotated.status, StatusCode::OK);
    let new_key_id = rotated.body["data"]["keyId"].as_str().unwrap().to_string();
    assert_ne!(new_key_id, old_key_id);

    let advertised = app.request("GET", "/api/crypto/public-key", None, None).await;
    assert_eq!(advertised.body["data"]["keyId"], new_key_id.as_str());

    let plaintext = app
        .state
        .key_manager
        .decrypt(&old_key_id, &old_ciphertext)
        .await
        .unwrap();
    assert_eq!(plaintext, "before rotation");

    // The active key cannot be purged; the retired one can.
    let conflict = app
        .request(
            "DELETE",
            &format!("/api/crypto/keys/{new_key_id}"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(conflict.status, StatusCode::CONFLICT);

    let purged = app
        .request(
            "DELETE",
            &format!("/api/crypto/keys/{old_key_id}"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(purged.status, StatusCode::OK);
}
