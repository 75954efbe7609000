//! Account operations behind the auth routes, in a live and a demo flavour.
//!
//! The live service talks to the user store and hashes passwords with argon2.
//! The demo service answers from a fixed credential list and never writes.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    mock_data::demo_accounts,
    models::{NewUser, ProfileUpdate, Registration, Role, User, normalize_email},
    repository::RepositoryState,
};

/// Hashes `password` into a PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// False for a wrong password and for a hash that does not parse.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            tracing::error!(error = %err, "stored password hash is malformed");
            false
        }
    }
}

/// Runs the hash off the async executor.
async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

async fn verify_blocking(hash: String, password: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&hash, &password))
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))
}

fn apply_profile(user: &mut User, update: ProfileUpdate) {
    if let Some(name) = update.name.map(|n| n.trim().to_string()) {
        if !name.is_empty() {
            user.name = name;
        }
    }
    if let Some(bio) = update.bio {
        let bio = bio.trim().to_string();
        user.bio = (!bio.is_empty()).then_some(bio);
    }
}

#[async_trait]
pub trait AccountService: Send + Sync {
    async fn register(&self, registration: Registration) -> Result<User, AppError>;

    /// Unknown email and wrong password fail identically.
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError>;

    async fn current_user(&self, id: Uuid) -> Result<User, AppError>;

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, AppError>;

    /// Demo responses are labelled so clients can tell nothing was persisted.
    fn is_demo(&self) -> bool;
}

pub type AccountServiceState = Arc<dyn AccountService>;

/// Accounts over the live user store.
pub struct StoreAccounts {
    repo: RepositoryState,
}

impl StoreAccounts {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl AccountService for StoreAccounts {
    async fn register(&self, registration: Registration) -> Result<User, AppError> {
        let password_hash = hash_blocking(registration.password).await?;
        let user = self
            .repo
            .create_user(NewUser {
                name: registration.name,
                email: registration.email,
                password_hash,
                role: Role::User,
                bio: None,
            })
            .await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let credentials = self
            .repo
            .find_credentials(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if verify_blocking(credentials.password_hash, password.to_string()).await? {
            Ok(credentials.user)
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    async fn current_user(&self, id: Uuid) -> Result<User, AppError> {
        self.repo
            .get_user(id)
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, AppError> {
        let mut user = self.current_user(id).await?;
        apply_profile(&mut user, update);
        self.repo
            .update_user(&user)
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    fn is_demo(&self) -> bool {
        false
    }
}

/// Accounts served from the fixed demo credentials.
#[derive(Default)]
pub struct DemoAccounts;

#[async_trait]
impl AccountService for DemoAccounts {
    async fn register(&self, registration: Registration) -> Result<User, AppError> {
        // Minted for the response only.
        Ok(User {
            id: Uuid::new_v4(),
            name: registration.name,
            email: registration.email,
            role: Role::User,
            bio: None,
            created_at: Utc::now(),
        })
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        demo_accounts()
            .iter()
            .find(|account| account.user.email == email && account.password == password)
            .map(|account| account.user.clone())
            .ok_or(AppError::InvalidCredentials)
    }

    async fn current_user(&self, id: Uuid) -> Result<User, AppError> {
        demo_accounts()
            .iter()
            .find(|account| account.user.id == id)
            .map(|account| account.user.clone())
            .ok_or(AppError::NotFound("User"))
    }

    async fn update_profile(&self, _id: Uuid, _update: ProfileUpdate) -> Result<User, AppError> {
        Err(AppError::store_unavailable())
    }

    fn is_demo(&self) -> bool {
        true
    }
}
