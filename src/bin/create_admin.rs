//! Administrative bootstrap: creates the administrator account, or resets the
//! password of an existing account and promotes it to admin.
//!
//! Reads `ADMIN_EMAIL`, `ADMIN_PASSWORD` and optionally `ADMIN_NAME`, plus the
//! usual store configuration. Unlike the server, this refuses to run without a
//! reachable database.

use std::env;

use gallery_portal::{
    accounts::hash_password,
    config::AppConfig,
    models::{NewUser, Role, is_plausible_email, normalize_email},
    repository::{PostgresRepository, Repository, run_migrations},
};
use sqlx::postgres::PgPoolOptions;

const DEFAULT_ADMIN_NAME: &str = "Admin";
const MIN_PASSWORD_LEN: usize = 6;

fn required(name: &str) -> Result<String, String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("{name} must be set"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "create_admin=info,gallery_portal=info".into()),
        )
        .init();

    let config = AppConfig::load()?;
    let email = normalize_email(&required("ADMIN_EMAIL")?);
    let password = required("ADMIN_PASSWORD")?;
    let name = env::var("ADMIN_NAME")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string());

    if !is_plausible_email(&email) {
        return Err(format!("ADMIN_EMAIL `{email}` is not a valid address").into());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!("ADMIN_PASSWORD must be at least {MIN_PASSWORD_LEN} characters").into());
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.db_url)
        .await?;
    run_migrations(&pool).await?;

    let password_hash = hash_password(&password).map_err(|e| e.to_string())?;
    let repo = PostgresRepository::new(pool);
    let admin = repo
        .upsert_admin(NewUser {
            name,
            email,
            password_hash,
            role: Role::Admin,
            bio: None,
        })
        .await?;

    tracing::info!(user_id = %admin.id, email = %admin.email, "administrator ready");
    Ok(())
}
