// Test helpers are intentionally partially used
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use qr_attendance::{
    build_router, create_state, AppConfig, ServerConfig, SessionsConfig, TokenConfig,
};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tower::ServiceExt;

// ============================================================================
// Test Setup
// ============================================================================

/// Configuration with explicit values, independent of the process environment.
pub fn test_config(metrics_type: &str, token_ttl: Duration, rotation: Duration) -> AppConfig {
    // ---
    AppConfig {
        server: ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            allowed_origins: vec!["*".to_string()],
            metrics_type: metrics_type.to_string(),
        },
        token: TokenConfig {
            ttl: token_ttl,
            rotation_interval: rotation,
        },
        sessions: SessionsConfig {
            idle_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
        },
    }
}

pub fn default_config() -> AppConfig {
    test_config("noop", Duration::from_secs(5), Duration::from_secs(2))
}

/// Router over a private, empty store.
pub fn test_router(config: &AppConfig) -> Router {
    // ---
    let state = create_state(config).expect("Should be able to create state");
    build_router(state, &config.server)
}

/// POST a JSON body through the router and decode the JSON reply.
pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    // ---
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

/// A logged-in user as seen by a client.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: String,
    pub auth_token: String,
}

impl Account {
    /// Identity fields merged into `extra`.
    pub fn body(&self, extra: Value) -> Value {
        // ---
        let mut body = json!({
            "userId": self.user_id,
            "authToken": self.auth_token,
        });
        if let (Some(target), Value::Object(fields)) = (body.as_object_mut(), extra) {
            target.extend(fields);
        }
        body
    }
}

/// Register then log in through the router.
pub async fn sign_up(app: &Router, username: &str, role: &str) -> Account {
    // ---
    let (status, _) = post_json(
        app,
        "/register",
        json!({ "username": username, "password": "pw", "role": role }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register {username}");

    let (status, body) = post_json(
        app,
        "/login",
        json!({ "username": username, "password": "pw" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login {username}");

    Account {
        user_id: body["userId"].as_str().unwrap().to_string(),
        auth_token: body["authToken"].as_str().unwrap().to_string(),
    }
}

// ============================================================================
// Live server
// ============================================================================

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new(config: &AppConfig) -> Self {
        // --

        // Enable debug logging only when requested
        if std::env::var("TEST_DEBUG").is_ok() {
            std::env::set_var("RUST_LOG", "debug");
            std::env::set_var("NO_COLOR", "1");
        }

        let app = test_router(config);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    /// POST JSON and return status plus decoded body.
    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        // ---
        let response = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request");

        let status = response.status().as_u16();
        let json = response.json().await.unwrap_or(Value::Null);
        (status, json)
    }

    /// Register then log in over HTTP.
    pub async fn sign_up(&self, username: &str, role: &str) -> Account {
        // ---
        let (status, _) = self
            .post(
                "/register",
                json!({ "username": username, "password": "pw", "role": role }),
            )
            .await;
        assert_eq!(status, 200, "register {username}");

        let (status, body) = self
            .post("/login", json!({ "username": username, "password": "pw" }))
            .await;
        assert_eq!(status, 200, "login {username}");

        Account {
            user_id: body["userId"].as_str().unwrap().to_string(),
            auth_token: body["authToken"].as_str().unwrap().to_string(),
        }
    }
}
