use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Artwork, ArtworkCategory, ArtworkQuery, Blog, BlogQuery, Comment, Contact, ContactStatus,
    Course, CourseQuery, EntityCounts, EntityKind, NewUser, Reply, Role, ShopItem, ShopQuery,
    Subscriber, User, UserCredentials,
};

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::{PostgresRepository, run_migrations};

/// Failures surfaced by a persistence backend.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type RepoResult<T> = Result<T, RepoError>;

pub const DUPLICATE_EMAIL: &str = "User already exists with this email";
pub const DUPLICATE_SLUG: &str = "A blog post with this slug already exists";
pub const DUPLICATE_SUBSCRIBER: &str = "Email already subscribed";

/// Repository Trait
///
/// The persistence contract for every entity collection. Handlers only ever see
/// `Arc<dyn Repository>`, so the Postgres store and the in-memory store used by the
/// test-suite are interchangeable.
///
/// Updates are whole-document replacements: callers load a record, apply a patch
/// from `models`, then hand the result back. `None` from a replace or lookup means
/// the identifier has no document. Blog comment threads are the exception: they
/// are edited in place so concurrent writers never overwrite each other.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    /// Fails with `RepoError::Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    /// Looks up by normalised email, returning the password hash alongside.
    async fn find_credentials(&self, email: &str) -> RepoResult<Option<UserCredentials>>;
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    /// Persists name and bio.
    async fn update_user(&self, user: &User) -> RepoResult<Option<User>>;
    /// Newest first.
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    async fn recent_users(&self, limit: usize) -> RepoResult<Vec<User>>;
    async fn set_user_role(&self, id: Uuid, role: Role) -> RepoResult<Option<User>>;
    async fn delete_user(&self, id: Uuid) -> RepoResult<bool>;
    /// Creates the account as admin, or resets the password and promotes an existing one.
    async fn upsert_admin(&self, user: NewUser) -> RepoResult<User>;

    // --- Artworks ---
    async fn list_artworks(&self, query: &ArtworkQuery) -> RepoResult<Vec<Artwork>>;
    async fn get_artwork(&self, id: Uuid) -> RepoResult<Option<Artwork>>;
    /// Adds one to the view counter and returns the updated document.
    async fn view_artwork(&self, id: Uuid) -> RepoResult<Option<Artwork>>;
    async fn create_artwork(&self, artwork: &Artwork) -> RepoResult<Artwork>;
    async fn replace_artwork(&self, artwork: &Artwork) -> RepoResult<Option<Artwork>>;
    async fn delete_artwork(&self, id: Uuid) -> RepoResult<bool>;
    /// Distinct categories in use, alphabetical.
    async fn artwork_categories(&self) -> RepoResult<Vec<ArtworkCategory>>;

    // --- Blogs ---
    /// Newest first.
    async fn list_blogs(&self, query: &BlogQuery) -> RepoResult<Vec<Blog>>;
    async fn get_blog(&self, id: Uuid) -> RepoResult<Option<Blog>>;
    async fn view_blog(&self, id: Uuid) -> RepoResult<Option<Blog>>;
    /// Fails with `RepoError::Conflict` when the slug is taken.
    async fn create_blog(&self, blog: &Blog) -> RepoResult<Blog>;
    /// Persists the editable fields. The comment thread and view counter keep
    /// their stored values.
    async fn replace_blog(&self, blog: &Blog) -> RepoResult<Option<Blog>>;
    async fn delete_blog(&self, id: Uuid) -> RepoResult<bool>;

    // Thread edits apply in place against the stored thread. `None` means the
    // blog, or the comment or reply addressed inside it, does not exist.
    async fn push_comment(&self, blog_id: Uuid, comment: &Comment) -> RepoResult<Option<Blog>>;
    async fn remove_comment(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<Blog>>;
    async fn push_reply(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        reply: &Reply,
    ) -> RepoResult<Option<Blog>>;
    async fn remove_reply(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        reply_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<Blog>>;

    // --- Courses ---
    async fn list_courses(&self, query: &CourseQuery) -> RepoResult<Vec<Course>>;
    async fn get_course(&self, id: Uuid) -> RepoResult<Option<Course>>;
    async fn create_course(&self, course: &Course) -> RepoResult<Course>;
    async fn replace_course(&self, course: &Course) -> RepoResult<Option<Course>>;
    async fn delete_course(&self, id: Uuid) -> RepoResult<bool>;

    // --- Shop ---
    async fn list_shop_items(&self, query: &ShopQuery) -> RepoResult<Vec<ShopItem>>;
    async fn get_shop_item(&self, id: Uuid) -> RepoResult<Option<ShopItem>>;
    async fn create_shop_item(&self, item: &ShopItem) -> RepoResult<ShopItem>;
    async fn replace_shop_item(&self, item: &ShopItem) -> RepoResult<Option<ShopItem>>;
    async fn delete_shop_item(&self, id: Uuid) -> RepoResult<bool>;

    // --- Contacts ---
    async fn create_contact(&self, contact: &Contact) -> RepoResult<Contact>;
    /// Newest first.
    async fn list_contacts(&self) -> RepoResult<Vec<Contact>>;
    async fn recent_contacts(&self, limit: usize) -> RepoResult<Vec<Contact>>;
    async fn set_contact_status(&self, id: Uuid, status: ContactStatus)
    -> RepoResult<Option<Contact>>;
    async fn delete_contact(&self, id: Uuid) -> RepoResult<bool>;

    // --- Subscribers ---
    async fn find_subscriber(&self, email: &str) -> RepoResult<Option<Subscriber>>;
    /// Fails with `RepoError::Conflict` when the email is already subscribed.
    async fn create_subscriber(&self, subscriber: &Subscriber) -> RepoResult<Subscriber>;
    async fn list_subscribers(&self) -> RepoResult<Vec<Subscriber>>;
    async fn delete_subscriber(&self, id: Uuid) -> RepoResult<bool>;

    // --- Admin ---
    async fn entity_counts(&self) -> RepoResult<EntityCounts>;
    /// Deletes exactly the listed documents of one kind and reports how many went.
    async fn bulk_delete(&self, kind: EntityKind, ids: &[Uuid]) -> RepoResult<u64>;
}

/// RepositoryState
///
/// The shared handle stored in application state.
pub type RepositoryState = Arc<dyn Repository>;
