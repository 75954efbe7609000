//! End-to-end tests against a real Postgres. Run with
//! `cargo test --test api_tests -- --ignored` once `DATABASE_URL` (or the local
//! default) points at a disposable database.

use gallery_portal::{
    AppConfig, AppState, MockStorageService, NoopMailer, PoolProbe, create_router,
    accounts::hash_password,
    models::{NewUser, Role},
    repository::{PostgresRepository, Repository, RepositoryState, run_migrations},
};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub pool: sqlx::PgPool,
}

async fn spawn_app() -> TestApp {
    dotenv::dotenv().ok();

    let config = AppConfig {
        rate_limit_max: 10_000,
        ..AppConfig::load().expect("config")
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("Failed to connect to Postgres in tests");
    run_migrations(&pool).await.expect("migrations");

    let probe = PoolProbe::new(pool.clone());
    assert!(probe.check().await, "database should be reachable");

    let repo = Arc::new(PostgresRepository::new(pool.clone())) as RepositoryState;
    let state = AppState::new(
        repo,
        Arc::new(probe),
        Arc::new(MockStorageService::new()),
        Arc::new(NoopMailer),
        config,
    );
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().expect("local addr").port();
    let address = format!("http://127.0.0.1:{port}");

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("server");
    });

    TestApp { address, pool }
}

fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

async fn admin_token(app: &TestApp, client: &reqwest::Client) -> String {
    let email = unique_email("admin");
    PostgresRepository::new(app.pool.clone())
        .upsert_admin(NewUser {
            name: "E2E Admin".to_string(),
            email: email.clone(),
            password_hash: hash_password("admin-secret").expect("hash"),
            role: Role::Admin,
            bio: None,
        })
        .await
        .expect("seed admin");

    let body: Value = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&json!({ "email": email, "password": "admin-secret" }))
        .send()
        .await
        .expect("login")
        .json()
        .await
        .expect("login body");
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["dbConnected"], true);
}

#[tokio::test]
#[ignore]
async fn test_register_login_me() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email("reader");

    let response = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&json!({
            "name": "Reader", "email": email, "password": "secret1", "confirmPassword": "secret1"
        }))
        .send()
        .await
        .expect("register");
    assert_eq!(response.status(), 201);

    let again = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&json!({
            "name": "Reader", "email": email, "password": "secret1", "confirmPassword": "secret1"
        }))
        .send()
        .await
        .expect("register again");
    assert_eq!(again.status(), 409);

    let login: Value = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await
        .expect("login")
        .json()
        .await
        .expect("login body");
    let token = login["token"].as_str().expect("token");

    let me = client
        .get(format!("{}/api/auth/me", app.address))
        .bearer_auth(token)
        .send()
        .await
        .expect("me");
    assert_eq!(me.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_artwork_lifecycle() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&app, &client).await;

    let response = client
        .post(format!("{}/api/artworks", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "title": "E2E Piece",
            "description": "end to end",
            "imageUrl": "https://img.example.com/e2e.png",
            "category": "digital"
        }))
        .send()
        .await
        .expect("create");
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.expect("json");
    let id = created["_id"].as_str().expect("id");

    for expected in 1..=2 {
        let fetched: Value = client
            .get(format!("{}/api/artworks/{id}", app.address))
            .send()
            .await
            .expect("get")
            .json()
            .await
            .expect("json");
        assert_eq!(fetched["views"], expected);
    }

    let views: i64 = sqlx::query_scalar("SELECT views FROM artworks WHERE id = $1")
        .bind(Uuid::parse_str(id).expect("uuid"))
        .fetch_one(&app.pool)
        .await
        .expect("views");
    assert_eq!(views, 2);

    let deleted = client
        .delete(format!("{}/api/artworks/{id}", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete");
    assert_eq!(deleted.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_newsletter_idempotent() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email("fan");

    let first = client
        .post(format!("{}/api/newsletter", app.address))
        .json(&json!({ "email": email }))
        .send()
        .await
        .expect("subscribe");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/api/newsletter", app.address))
        .json(&json!({ "email": email.to_uppercase() }))
        .send()
        .await
        .expect("subscribe again");
    assert_eq!(second.status(), 200);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscribers WHERE email = $1")
        .bind(&email)
        .fetch_one(&app.pool)
        .await
        .expect("count");
    assert_eq!(count, 1);
}
