//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use keyward_api::AppState;
use keyward_core::config::{AppConfig, PasswordHashConfig};
use keyward_crypto::rsa::encrypt_with_public_key;
use keyward_database::{MemoryKeyPairRepository, MemoryPrincipalRepository, PrincipalRepository};
use keyward_entity::session::Principal;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Wired components, for direct assertions
    pub state: AppState,
    principals: Arc<MemoryPrincipalRepository>,
}

impl TestApp {
    /// Create a new test application with small keys and cheap hashing
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.crypto.default_key_size = 1024;
        config.auth.jwt_secret = "integration-test-secret-0123456789".to_string();
        config.auth.password_hash = PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        config.worker.enabled = false;

        let principals = Arc::new(MemoryPrincipalRepository::new());
        let state = AppState::build(
            config,
            Arc::new(MemoryKeyPairRepository::new()),
            principals.clone(),
        )
        .expect("Failed to build app state");

        Self {
            router: keyward_api::build_router(state.clone()),
            state,
            principals,
        }
    }

    /// Create a user with the given roles
    pub async fn create_user(&self, user_id: i64, username: &str, password: &str, roles: &[&str]) {
        let principal = Principal {
            user_id,
            username: username.to_string(),
            password_hash: self
                .state
                .password_hasher
                .hash_for_storage(password)
                .expect("Failed to hash password"),
            roles: roles.iter().map(|r| r.to_string()).collect::<BTreeSet<_>>(),
        };
        self.principals
            .create(&principal)
            .await
            .expect("Failed to create user");
    }

    /// Fetch the advertised public key and encrypt `plaintext` the way a client would
    pub async fn encrypt_for_server(&self, plaintext: &str) -> (String, String) {
        let response = self.request("GET", "/api/crypto/public-key", None, None).await;
        assert_eq!(response.status, StatusCode::OK);

        let key_id = response.body["data"]["keyId"]
            .as_str()
            .expect("keyId missing")
            .to_string();
        let public_key = response.body["data"]["publicKey"]
            .as_str()
            .expect("publicKey missing");

        let ciphertext =
            encrypt_with_public_key(public_key, plaintext).expect("Failed to encrypt");
        (key_id, ciphertext)
    }

    /// Log in with an encrypted password and return the bearer token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let (key_id, ciphertext) = self.encrypt_for_server(password).await;
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({
                    "username": username,
                    "password": ciphertext,
                    "keyId": key_id,
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);

        response.body["data"]["token"]
            .as_str()
            .expect("token missing")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Parsed test response
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}
