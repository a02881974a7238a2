//! Integration test helpers
//!
//! Each test gets its own server on an ephemeral port backed by the
//! in-memory store.

#![allow(dead_code)]

use postboard_web::AppState;
use serde_json::{json, Value};
use std::sync::LazyLock;
use tokio::net::TcpListener;
use uuid::Uuid;

// Initialise tracing once; set TEST_LOG to see output
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

pub struct TestApp {
    pub address: String,
    pub state: AppState,
    pub api_client: reqwest::Client,
}

/// Credentials of a signed-up account
pub struct TestUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub usertype: String,
}

impl TestUser {
    pub fn generate(usertype: &str) -> Self {
        let tag = Uuid::new_v4().simple().to_string();
        Self {
            email: format!("{}@x.com", &tag[..12]),
            username: format!("user-{}", &tag[..12]),
            password: "pw".to_string(),
            usertype: usertype.to_string(),
        }
    }

    pub fn signup_body(&self) -> Value {
        json!({
            "email": self.email,
            "username": self.username,
            "password": self.password,
            "usertype": self.usertype,
        })
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_signup(&self, body: &Value) -> reqwest::Response {
        self.api_client
            .post(self.url("/auth/signup"))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_login(&self, body: &Value) -> reqwest::Response {
        self.api_client
            .post(self.url("/auth/login"))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Sign up and log in, returning the auth token
    pub async fn signup_and_login(&self, user: &TestUser) -> String {
        let response = self.post_signup(&user.signup_body()).await;
        assert_eq!(response.status().as_u16(), 200);

        let response = self
            .post_login(&json!({"email": user.email, "password": user.password}))
            .await;
        assert_eq!(response.status().as_u16(), 200);

        let body: Value = response.json().await.expect("login body");
        body["auth_token"]
            .as_str()
            .expect("auth_token in login body")
            .to_string()
    }

    /// Look up an account id by username through the store
    pub async fn user_id(&self, username: &str) -> String {
        self.state
            .directory
            .account_by_username(username)
            .await
            .expect("store lookup")
            .expect("account exists")
            .user_id
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.api_client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: &Value,
    ) -> reqwest::Response {
        self.api_client
            .request(method, self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.api_client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn spawn_app() -> TestApp {
    LazyLock::force(&TRACING);

    let state = AppState::in_memory();
    let app = postboard_web::create_app(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        state,
        api_client: client,
    }
}
