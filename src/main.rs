use std::{net::SocketAddr, sync::Arc};

use gallery_portal::{
    AppState,
    config::{AppConfig, Env},
    connectivity::PoolProbe,
    create_router,
    mailer::{MailerState, NoopMailer, SmtpMailer},
    repository::{PostgresRepository, RepositoryState},
    storage::{S3StorageClient, StorageService, StorageState},
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initialises logging, wires the store, image host and
/// mailer into `AppState`, and serves the router. The store pool is lazy: the
/// server comes up in demo mode when Postgres is unreachable and switches to
/// live data once the heartbeat sees it.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gallery_portal=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // --- Store ---
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .connect_lazy(&config.db_url)?;

    let probe = PoolProbe::new(pool.clone());
    if !probe.check().await {
        tracing::warn!("database not reachable at startup, serving demo data");
    }
    probe.spawn_heartbeat(config.db_heartbeat);

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // --- Image host ---
    let s3_client = S3StorageClient::new(&config);
    if config.env == Env::Local {
        s3_client.ensure_bucket_exists().await;
    }
    let storage = Arc::new(s3_client) as StorageState;

    // --- Mail ---
    let mailer: MailerState = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => {
            tracing::info!("SMTP_HOST not set, contact notifications are logged only");
            Arc::new(NoopMailer)
        }
    };

    let port = config.port;
    let app_state = AppState::new(repo, Arc::new(probe), storage, mailer, config);
    let app = create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {addr}");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:{port}/swagger-ui");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
