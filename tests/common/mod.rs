// tests/common/mod.rs

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use gym_coach::{
    coach::{CoachError, CoachModel, CompletionRequest},
    config::{Config, OpenAiConfig},
    routes,
    state::AppState,
};
use serde_json::{Value, json};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub const PASSWORD: &str = "password123";
pub const DEFAULT_REPLY: &str = "Keep going, you are doing well.";

/// Fake language model. Replies are served in order; once the script runs out it
/// answers with `DEFAULT_REPLY`. Every request is recorded.
#[derive(Default)]
pub struct ScriptedCoach {
    replies: Mutex<VecDeque<Result<String, CoachError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCoach {
    pub fn reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn fail(&self) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(CoachError::Transport("connection refused".to_string())));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CoachModel for ScriptedCoach {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CoachError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_REPLY.to_string()))
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub pool: SqlitePool,
    pub coach: Arc<ScriptedCoach>,
}

/// Spawns the app on a random port, backed by a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    let coach = Arc::new(ScriptedCoach::default());
    spawn_app_with(coach.clone(), coach).await
}

/// Same as `spawn_app` but with a caller-provided model behind the router.
pub async fn spawn_app_with(model: Arc<dyn CoachModel>, coach: Arc<ScriptedCoach>) -> TestApp {
    // One connection that never expires, so the in-memory database lives as long as the pool.
    let options: SqliteConnectOptions = "sqlite::memory:".parse().expect("valid sqlite url");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options.foreign_keys(true))
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        bind_address: "127.0.0.1:0".parse().unwrap(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        openai: OpenAiConfig::default(),
    };

    let state = AppState {
        pool: pool.clone(),
        config,
        coach: model,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        pool,
        coach,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    pub async fn register(&self, username: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/register"))
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": PASSWORD,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Registers `username` and returns a bearer token for it.
    pub async fn signup(&self, username: &str) -> String {
        let response = self.register(username).await;
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");

        body["access_token"]
            .as_str()
            .expect("Token not found")
            .to_string()
    }

    pub async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, token: &str, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, token: &str, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Short unique username for a test user.
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}
