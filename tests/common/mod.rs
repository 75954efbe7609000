#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use gallery_portal::{
    AppConfig, AppState, JwtKeys, MemoryRepository, MockStorageService, NoopMailer, StaticProbe,
    accounts::hash_password,
    create_router,
    models::{NewUser, Role, User},
    repository::{Repository, RepositoryState},
};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "admin-secret";
pub const USER_PASSWORD: &str = "user-secret";

/// In-process application over the memory store. `probe` flips the app
/// between live and demo mode.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub probe: StaticProbe,
    pub storage: MockStorageService,
    pub jwt: JwtKeys,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        rate_limit_max: 1_000_000,
        ..AppConfig::default()
    }
}

pub fn spawn_app() -> TestApp {
    spawn_with(true, test_config())
}

pub fn spawn_demo_app() -> TestApp {
    spawn_with(false, test_config())
}

pub fn spawn_with(connected: bool, config: AppConfig) -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let probe = StaticProbe::new(connected);
    let storage = MockStorageService::new();
    let jwt = JwtKeys::from_config(&config);

    let state = AppState::new(
        repo.clone() as RepositoryState,
        Arc::new(probe.clone()),
        Arc::new(storage.clone()),
        Arc::new(NoopMailer),
        config,
    );

    TestApp {
        router: create_router(state),
        repo,
        probe,
        storage,
        jwt,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::PUT, uri, token, Some(body))).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::PATCH, uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    /// Persists an account directly and returns it with a valid token.
    pub async fn seed_user(&self, name: &str, email: &str, role: Role) -> (User, String) {
        let password = match role {
            Role::Admin => ADMIN_PASSWORD,
            Role::User => USER_PASSWORD,
        };
        let user = self
            .repo
            .create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password).expect("hash"),
                role,
                bio: None,
            })
            .await
            .expect("seed user");
        let token = self.jwt.issue(user.id, role).expect("token");
        (user, token)
    }

    pub async fn seed_admin(&self) -> (User, String) {
        self.seed_user("Gallery Admin", "admin@gallery.test", Role::Admin)
            .await
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// One part of a hand-built multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

const BOUNDARY: &str = "gallery-test-boundary";

pub fn multipart_request(method: Method, uri: &str, token: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("multipart request")
}
