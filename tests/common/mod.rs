// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::Algorithm;
use past_exams::{
    ai::{AiError, TextGenerator},
    config::Config,
    db, routes,
    state::AppState,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;

pub const PASSWORD: &str = "password123";

/// Stands in for the AI provider: always answers with the same reply, or
/// always fails as if the provider were unreachable.
pub enum ScriptedGenerator {
    Reply(String),
    Unreachable,
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
        match self {
            ScriptedGenerator::Reply(text) => Ok(text.clone()),
            ScriptedGenerator::Unreachable => {
                Err(AiError::Transport("connection refused".to_string()))
            }
        }
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub pool: SqlitePool,
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_algorithm: Algorithm::HS256,
        jwt_expiration: 600, // 10 minutes for tests
        ai_api_key: "unused".to_string(),
        ai_model: "unused".to_string(),
        ai_base_url: "http://127.0.0.1:9".to_string(),
        ai_timeout_secs: 1,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        rust_log: "error".to_string(),
    }
}

/// Builds the state the router runs on: fresh in-memory database, schema applied.
pub async fn test_state(generator: ScriptedGenerator) -> AppState {
    let config = test_config();

    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to open in-memory database");
    db::migrate(&pool).await.expect("Failed to migrate database");

    AppState {
        pool,
        config,
        ai: Arc::new(generator),
    }
}

/// Spawns the app on a random port, with a generator that always fails.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(ScriptedGenerator::Unreachable).await
}

pub async fn spawn_app_with(generator: ScriptedGenerator) -> TestApp {
    let state = test_state(generator).await;
    let pool = state.pool.clone();

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
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
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/register"))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, identifier: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": identifier, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Registers `username` with the default password and returns a token.
    pub async fn signup(&self, username: &str) -> String {
        let res = self
            .register(username, &format!("{}@example.com", username), PASSWORD)
            .await;
        assert_eq!(res.status().as_u16(), 201, "registration of {} failed", username);

        let res = self.login(username, PASSWORD).await;
        assert_eq!(res.status().as_u16(), 200);
        let body: Value = res.json().await.unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: &Value) -> reqwest::Response {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates an exam and returns the response body.
    pub async fn create_exam(&self, token: &str, exam: Value) -> Value {
        let res = self.post_json("/exams", Some(token), &exam).await;
        assert_eq!(res.status().as_u16(), 201);
        res.json().await.unwrap()
    }

    pub async fn question_rows(&self, exam_id: i64) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE exam_id = ?")
            .bind(exam_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// A minimal valid exam payload.
pub fn exam_payload(title: &str, course_name: &str, year: i32, semester: &str) -> Value {
    json!({
        "title": title,
        "course_name": course_name,
        "year": year,
        "semester": semester,
    })
}
