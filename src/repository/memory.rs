use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    DUPLICATE_EMAIL, DUPLICATE_SLUG, DUPLICATE_SUBSCRIBER, RepoError, RepoResult, Repository,
};
use crate::models::{
    Artwork, ArtworkCategory, ArtworkQuery, Blog, BlogQuery, Comment, Contact, ContactStatus,
    Course, CourseQuery, EntityCounts, EntityKind, NewUser, Reply, Role, ShopItem, ShopQuery,
    Subscriber, User, UserCredentials,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserCredentials>,
    artworks: HashMap<Uuid, Artwork>,
    blogs: HashMap<Uuid, Blog>,
    courses: HashMap<Uuid, Course>,
    shop_items: HashMap<Uuid, ShopItem>,
    contacts: HashMap<Uuid, Contact>,
    subscribers: HashMap<Uuid, Subscriber>,
}

/// MemoryRepository
///
/// Process-local `Repository` with the same filtering, ordering and uniqueness rules
/// as the Postgres store. Backs the integration tests.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

fn newest_first<T>(mut rows: Vec<T>, created: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(created(row)));
    rows
}

/// Removes every listed key, returning how many were present.
fn remove_all<V>(table: &mut HashMap<Uuid, V>, ids: &[Uuid]) -> u64 {
    ids.iter().filter(|id| table.remove(id).is_some()).count() as u64
}

fn replace<V: Clone>(table: &mut HashMap<Uuid, V>, id: Uuid, value: &V) -> Option<V> {
    let slot = table.get_mut(&id)?;
    *slot = value.clone();
    Some(value.clone())
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|c| c.user.email == user.email) {
            return Err(RepoError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            role: user.role,
            bio: user.bio,
            created_at: Utc::now(),
        };
        tables.users.insert(
            record.id,
            UserCredentials {
                user: record.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(record)
    }

    async fn find_credentials(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|c| c.user.email == email)
            .cloned())
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|c| c.user.clone()))
    }

    async fn update_user(&self, user: &User) -> RepoResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&user.id).map(|c| {
            c.user.name = user.name.clone();
            c.user.bio = user.bio.clone();
            c.user.clone()
        }))
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let tables = self.tables.read().await;
        let users = tables.users.values().map(|c| c.user.clone()).collect();
        Ok(newest_first(users, |u: &User| u.created_at))
    }

    async fn recent_users(&self, limit: usize) -> RepoResult<Vec<User>> {
        let mut users = self.list_users().await?;
        users.truncate(limit);
        Ok(users)
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> RepoResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|c| {
            c.user.role = role;
            c.user.clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.tables.write().await.users.remove(&id).is_some())
    }

    async fn upsert_admin(&self, user: NewUser) -> RepoResult<User> {
        {
            let mut tables = self.tables.write().await;
            if let Some(existing) = tables
                .users
                .values_mut()
                .find(|c| c.user.email == user.email)
            {
                existing.password_hash = user.password_hash;
                existing.user.role = Role::Admin;
                return Ok(existing.user.clone());
            }
        }
        self.create_user(NewUser {
            role: Role::Admin,
            ..user
        })
        .await
    }

    async fn list_artworks(&self, query: &ArtworkQuery) -> RepoResult<Vec<Artwork>> {
        let tables = self.tables.read().await;
        Ok(query.apply(tables.artworks.values().cloned()))
    }

    async fn get_artwork(&self, id: Uuid) -> RepoResult<Option<Artwork>> {
        Ok(self.tables.read().await.artworks.get(&id).cloned())
    }

    async fn view_artwork(&self, id: Uuid) -> RepoResult<Option<Artwork>> {
        let mut tables = self.tables.write().await;
        Ok(tables.artworks.get_mut(&id).map(|a| {
            a.views += 1;
            a.clone()
        }))
    }

    async fn create_artwork(&self, artwork: &Artwork) -> RepoResult<Artwork> {
        let mut tables = self.tables.write().await;
        tables.artworks.insert(artwork.id, artwork.clone());
        Ok(artwork.clone())
    }

    async fn replace_artwork(&self, artwork: &Artwork) -> RepoResult<Option<Artwork>> {
        let mut tables = self.tables.write().await;
        Ok(replace(&mut tables.artworks, artwork.id, artwork))
    }

    async fn delete_artwork(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.tables.write().await.artworks.remove(&id).is_some())
    }

    async fn artwork_categories(&self) -> RepoResult<Vec<ArtworkCategory>> {
        let tables = self.tables.read().await;
        let mut categories: Vec<ArtworkCategory> =
            tables.artworks.values().map(|a| a.category).collect();
        categories.sort_by_key(|c| c.as_str());
        categories.dedup();
        Ok(categories)
    }

    async fn list_blogs(&self, query: &BlogQuery) -> RepoResult<Vec<Blog>> {
        let tables = self.tables.read().await;
        let matching = tables
            .blogs
            .values()
            .filter(|b| query.matches(b))
            .cloned()
            .collect();
        let mut blogs = newest_first(matching, |b: &Blog| b.created_at);
        if let Some(limit) = query.limit {
            blogs.truncate(limit);
        }
        Ok(blogs)
    }

    async fn get_blog(&self, id: Uuid) -> RepoResult<Option<Blog>> {
        Ok(self.tables.read().await.blogs.get(&id).cloned())
    }

    async fn view_blog(&self, id: Uuid) -> RepoResult<Option<Blog>> {
        let mut tables = self.tables.write().await;
        Ok(tables.blogs.get_mut(&id).map(|b| {
            b.views += 1;
            b.clone()
        }))
    }

    async fn create_blog(&self, blog: &Blog) -> RepoResult<Blog> {
        let mut tables = self.tables.write().await;
        if tables.blogs.values().any(|b| b.slug == blog.slug) {
            return Err(RepoError::Conflict(DUPLICATE_SLUG.to_string()));
        }
        tables.blogs.insert(blog.id, blog.clone());
        Ok(blog.clone())
    }

    async fn replace_blog(&self, blog: &Blog) -> RepoResult<Option<Blog>> {
        let mut tables = self.tables.write().await;
        if tables
            .blogs
            .values()
            .any(|b| b.id != blog.id && b.slug == blog.slug)
        {
            return Err(RepoError::Conflict(DUPLICATE_SLUG.to_string()));
        }
        let Some(stored) = tables.blogs.get_mut(&blog.id) else {
            return Ok(None);
        };
        let comments = std::mem::take(&mut stored.comments);
        let views = stored.views;
        *stored = Blog {
            comments,
            views,
            ..blog.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete_blog(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.tables.write().await.blogs.remove(&id).is_some())
    }

    async fn push_comment(&self, blog_id: Uuid, comment: &Comment) -> RepoResult<Option<Blog>> {
        let mut tables = self.tables.write().await;
        Ok(tables.blogs.get_mut(&blog_id).map(|blog| {
            blog.comments.push(comment.clone());
            blog.updated_at = comment.created_at;
            blog.clone()
        }))
    }

    async fn remove_comment(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<Blog>> {
        let mut tables = self.tables.write().await;
        let Some(blog) = tables.blogs.get_mut(&blog_id) else {
            return Ok(None);
        };
        let before = blog.comments.len();
        blog.comments.retain(|c| c.id != comment_id);
        if blog.comments.len() == before {
            return Ok(None);
        }
        blog.updated_at = at;
        Ok(Some(blog.clone()))
    }

    async fn push_reply(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        reply: &Reply,
    ) -> RepoResult<Option<Blog>> {
        let mut tables = self.tables.write().await;
        let Some(blog) = tables.blogs.get_mut(&blog_id) else {
            return Ok(None);
        };
        let Some(comment) = blog.comments.iter_mut().find(|c| c.id == comment_id) else {
            return Ok(None);
        };
        comment.replies.push(reply.clone());
        blog.updated_at = reply.created_at;
        Ok(Some(blog.clone()))
    }

    async fn remove_reply(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        reply_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<Blog>> {
        let mut tables = self.tables.write().await;
        let Some(blog) = tables.blogs.get_mut(&blog_id) else {
            return Ok(None);
        };
        let Some(comment) = blog.comments.iter_mut().find(|c| c.id == comment_id) else {
            return Ok(None);
        };
        let before = comment.replies.len();
        comment.replies.retain(|r| r.id != reply_id);
        if comment.replies.len() == before {
            return Ok(None);
        }
        blog.updated_at = at;
        Ok(Some(blog.clone()))
    }

    async fn list_courses(&self, query: &CourseQuery) -> RepoResult<Vec<Course>> {
        let tables = self.tables.read().await;
        let matching = tables
            .courses
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        Ok(newest_first(matching, |c: &Course| c.created_at))
    }

    async fn get_course(&self, id: Uuid) -> RepoResult<Option<Course>> {
        Ok(self.tables.read().await.courses.get(&id).cloned())
    }

    async fn create_course(&self, course: &Course) -> RepoResult<Course> {
        let mut tables = self.tables.write().await;
        tables.courses.insert(course.id, course.clone());
        Ok(course.clone())
    }

    async fn replace_course(&self, course: &Course) -> RepoResult<Option<Course>> {
        let mut tables = self.tables.write().await;
        Ok(replace(&mut tables.courses, course.id, course))
    }

    async fn delete_course(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.tables.write().await.courses.remove(&id).is_some())
    }

    async fn list_shop_items(&self, query: &ShopQuery) -> RepoResult<Vec<ShopItem>> {
        let tables = self.tables.read().await;
        Ok(query.apply(tables.shop_items.values().cloned()))
    }

    async fn get_shop_item(&self, id: Uuid) -> RepoResult<Option<ShopItem>> {
        Ok(self.tables.read().await.shop_items.get(&id).cloned())
    }

    async fn create_shop_item(&self, item: &ShopItem) -> RepoResult<ShopItem> {
        let mut tables = self.tables.write().await;
        tables.shop_items.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn replace_shop_item(&self, item: &ShopItem) -> RepoResult<Option<ShopItem>> {
        let mut tables = self.tables.write().await;
        Ok(replace(&mut tables.shop_items, item.id, item))
    }

    async fn delete_shop_item(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.tables.write().await.shop_items.remove(&id).is_some())
    }

    async fn create_contact(&self, contact: &Contact) -> RepoResult<Contact> {
        let mut tables = self.tables.write().await;
        tables.contacts.insert(contact.id, contact.clone());
        Ok(contact.clone())
    }

    async fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        let tables = self.tables.read().await;
        let contacts = tables.contacts.values().cloned().collect();
        Ok(newest_first(contacts, |c: &Contact| c.created_at))
    }

    async fn recent_contacts(&self, limit: usize) -> RepoResult<Vec<Contact>> {
        let mut contacts = self.list_contacts().await?;
        contacts.truncate(limit);
        Ok(contacts)
    }

    async fn set_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> RepoResult<Option<Contact>> {
        let mut tables = self.tables.write().await;
        Ok(tables.contacts.get_mut(&id).map(|c| {
            c.status = status;
            c.clone()
        }))
    }

    async fn delete_contact(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.tables.write().await.contacts.remove(&id).is_some())
    }

    async fn find_subscriber(&self, email: &str) -> RepoResult<Option<Subscriber>> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscribers
            .values()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn create_subscriber(&self, subscriber: &Subscriber) -> RepoResult<Subscriber> {
        let mut tables = self.tables.write().await;
        if tables
            .subscribers
            .values()
            .any(|s| s.email == subscriber.email)
        {
            return Err(RepoError::Conflict(DUPLICATE_SUBSCRIBER.to_string()));
        }
        tables.subscribers.insert(subscriber.id, subscriber.clone());
        Ok(subscriber.clone())
    }

    async fn list_subscribers(&self) -> RepoResult<Vec<Subscriber>> {
        let tables = self.tables.read().await;
        let subscribers = tables.subscribers.values().cloned().collect();
        Ok(newest_first(subscribers, |s: &Subscriber| s.created_at))
    }

    async fn delete_subscriber(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.tables.write().await.subscribers.remove(&id).is_some())
    }

    async fn entity_counts(&self) -> RepoResult<EntityCounts> {
        let tables = self.tables.read().await;
        Ok(EntityCounts {
            users: count(tables.users.len()),
            artworks: count(tables.artworks.len()),
            blogs: count(tables.blogs.len()),
            courses: count(tables.courses.len()),
            shop_items: count(tables.shop_items.len()),
            contacts: count(tables.contacts.len()),
            subscribers: count(tables.subscribers.len()),
        })
    }

    async fn bulk_delete(&self, kind: EntityKind, ids: &[Uuid]) -> RepoResult<u64> {
        let mut tables = self.tables.write().await;
        Ok(match kind {
            EntityKind::Artworks => remove_all(&mut tables.artworks, ids),
            EntityKind::Blogs => remove_all(&mut tables.blogs, ids),
            EntityKind::Courses => remove_all(&mut tables.courses, ids),
            EntityKind::ShopItems => remove_all(&mut tables.shop_items, ids),
        })
    }
}
