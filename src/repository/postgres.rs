use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder, types::Json};
use uuid::Uuid;

use super::{
    DUPLICATE_EMAIL, DUPLICATE_SLUG, DUPLICATE_SUBSCRIBER, RepoError, RepoResult, Repository,
};
use crate::models::{
    Artwork, ArtworkCategory, ArtworkQuery, ArtworkSort, Blog, BlogQuery, Comment, Contact,
    ContactStatus, Course, CourseQuery, EntityCounts, EntityKind, NewUser, Reply, Role, ShopItem,
    ShopQuery, ShopSort, Subscriber, User, UserCredentials,
};

const USER_COLUMNS: &str = "id, name, email, role, bio, created_at";
const ARTWORK_COLUMNS: &str = "id, title, description, artist_name, image_url, category, tags, \
     dimensions, year_created, featured, views, created_at";
const BLOG_COLUMNS: &str = "id, title, slug, excerpt, content, author, cover_image, categories, \
     tags, read_time, featured, views, comments, published, published_at, created_at, updated_at";
const COURSE_COLUMNS: &str = "id, title, description, instructor, price, duration, level, \
     category, curriculum, featured, students_enrolled, thumbnail, preview_video, requirements, \
     learning_outcomes, created_at";
const SHOP_COLUMNS: &str = "id, artwork_id, price, currency, available_quantity, is_original, \
     print_sizes, framing_options, shipping_info, sold, created_at";
const CONTACT_COLUMNS: &str = "id, name, email, subject, message, status, created_at";
const SUBSCRIBER_COLUMNS: &str = "id, email, source, created_at";

/// Applies the embedded schema migrations. Safe to call repeatedly.
pub async fn run_migrations(pool: &PgPool) -> RepoResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Maps a unique-index violation onto `RepoError::Conflict`.
fn unique_violation(message: &'static str) -> impl FnOnce(sqlx::Error) -> RepoError {
    move |err| {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return RepoError::Conflict(message.to_string());
            }
        }
        RepoError::Database(err)
    }
}

/// Escapes LIKE metacharacters so user search text matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. Filters are assembled with `QueryBuilder` so
/// every user-supplied value travels as a bind parameter.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Users ---

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash, role, bio, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(&user.bio)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_violation(DUPLICATE_EMAIL))
    }

    async fn find_credentials(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, UserCredentials>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_user(&self, user: &User) -> RepoResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET name = $2, bio = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.bio)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn recent_users(&self, limit: usize) -> RepoResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> RepoResult<Option<User>> {
        let sql = format!("UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn upsert_admin(&self, user: NewUser) -> RepoResult<User> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash, role, bio, created_at) \
             VALUES ($1, $2, $3, $4, 'admin', $5, NOW()) \
             ON CONFLICT (email) DO UPDATE \
             SET password_hash = EXCLUDED.password_hash, role = 'admin' \
             RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.bio)
            .fetch_one(&self.pool)
            .await?)
    }

    // --- Artworks ---

    async fn list_artworks(&self, query: &ArtworkQuery) -> RepoResult<Vec<Artwork>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ARTWORK_COLUMNS} FROM artworks WHERE TRUE"));

        if let Some(category) = &query.category {
            builder
                .push(" AND category = LOWER(")
                .push_bind(category.trim().to_string())
                .push(")");
        }
        if let Some(featured) = query.featured {
            builder.push(" AND featured = ").push_bind(featured);
        }

        builder.push(match query.sort {
            ArtworkSort::Newest => " ORDER BY created_at DESC",
            ArtworkSort::Oldest => " ORDER BY created_at ASC",
            ArtworkSort::Popular => " ORDER BY views DESC, created_at DESC",
        });

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(sql_limit(limit));
        }

        Ok(builder
            .build_query_as::<Artwork>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_artwork(&self, id: Uuid) -> RepoResult<Option<Artwork>> {
        let sql = format!("SELECT {ARTWORK_COLUMNS} FROM artworks WHERE id = $1");
        Ok(sqlx::query_as::<_, Artwork>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn view_artwork(&self, id: Uuid) -> RepoResult<Option<Artwork>> {
        let sql = format!(
            "UPDATE artworks SET views = views + 1 WHERE id = $1 RETURNING {ARTWORK_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Artwork>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_artwork(&self, artwork: &Artwork) -> RepoResult<Artwork> {
        let sql = format!(
            "INSERT INTO artworks ({ARTWORK_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {ARTWORK_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Artwork>(&sql)
            .bind(artwork.id)
            .bind(&artwork.title)
            .bind(&artwork.description)
            .bind(&artwork.artist_name)
            .bind(&artwork.image_url)
            .bind(artwork.category.as_str())
            .bind(Json(&artwork.tags))
            .bind(Json(&artwork.dimensions))
            .bind(artwork.year_created)
            .bind(artwork.featured)
            .bind(artwork.views)
            .bind(artwork.created_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn replace_artwork(&self, artwork: &Artwork) -> RepoResult<Option<Artwork>> {
        let sql = format!(
            "UPDATE artworks SET title = $2, description = $3, artist_name = $4, \
             image_url = $5, category = $6, tags = $7, dimensions = $8, year_created = $9, \
             featured = $10 WHERE id = $1 RETURNING {ARTWORK_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Artwork>(&sql)
            .bind(artwork.id)
            .bind(&artwork.title)
            .bind(&artwork.description)
            .bind(&artwork.artist_name)
            .bind(&artwork.image_url)
            .bind(artwork.category.as_str())
            .bind(Json(&artwork.tags))
            .bind(Json(&artwork.dimensions))
            .bind(artwork.year_created)
            .bind(artwork.featured)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_artwork(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM artworks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn artwork_categories(&self) -> RepoResult<Vec<ArtworkCategory>> {
        let raw: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM artworks ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        // Rows written by hand with a stray category are skipped, not fatal.
        Ok(raw.iter().filter_map(|c| c.parse().ok()).collect())
    }

    // --- Blogs ---

    async fn list_blogs(&self, query: &BlogQuery) -> RepoResult<Vec<Blog>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE TRUE"));

        if let Some(category) = &query.category {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM jsonb_array_elements_text(categories) AS c \
                     WHERE LOWER(c) = LOWER(",
                )
                .push_bind(category.clone())
                .push("))");
        }
        if let Some(search) = &query.search {
            let pattern = like_pattern(search);
            builder
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR content ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(published) = query.published {
            builder.push(" AND published = ").push_bind(published);
        }

        builder.push(" ORDER BY created_at DESC");

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(sql_limit(limit));
        }

        Ok(builder.build_query_as::<Blog>().fetch_all(&self.pool).await?)
    }

    async fn get_blog(&self, id: Uuid) -> RepoResult<Option<Blog>> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1");
        Ok(sqlx::query_as::<_, Blog>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn view_blog(&self, id: Uuid) -> RepoResult<Option<Blog>> {
        let sql = format!("UPDATE blogs SET views = views + 1 WHERE id = $1 RETURNING {BLOG_COLUMNS}");
        Ok(sqlx::query_as::<_, Blog>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_blog(&self, blog: &Blog) -> RepoResult<Blog> {
        let sql = format!(
            "INSERT INTO blogs ({BLOG_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {BLOG_COLUMNS}"
        );
        sqlx::query_as::<_, Blog>(&sql)
            .bind(blog.id)
            .bind(&blog.title)
            .bind(&blog.slug)
            .bind(&blog.excerpt)
            .bind(&blog.content)
            .bind(Json(&blog.author))
            .bind(&blog.cover_image)
            .bind(Json(&blog.categories))
            .bind(Json(&blog.tags))
            .bind(blog.read_time)
            .bind(blog.featured)
            .bind(blog.views)
            .bind(Json(&blog.comments))
            .bind(blog.published)
            .bind(blog.published_at)
            .bind(blog.created_at)
            .bind(blog.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_violation(DUPLICATE_SLUG))
    }

    async fn replace_blog(&self, blog: &Blog) -> RepoResult<Option<Blog>> {
        let sql = format!(
            "UPDATE blogs SET title = $2, slug = $3, excerpt = $4, content = $5, author = $6, \
             cover_image = $7, categories = $8, tags = $9, read_time = $10, featured = $11, \
             published = $12, published_at = $13, updated_at = $14 \
             WHERE id = $1 RETURNING {BLOG_COLUMNS}"
        );
        sqlx::query_as::<_, Blog>(&sql)
            .bind(blog.id)
            .bind(&blog.title)
            .bind(&blog.slug)
            .bind(&blog.excerpt)
            .bind(&blog.content)
            .bind(Json(&blog.author))
            .bind(&blog.cover_image)
            .bind(Json(&blog.categories))
            .bind(Json(&blog.tags))
            .bind(blog.read_time)
            .bind(blog.featured)
            .bind(blog.published)
            .bind(blog.published_at)
            .bind(blog.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(unique_violation(DUPLICATE_SLUG))
    }

    async fn delete_blog(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn push_comment(&self, blog_id: Uuid, comment: &Comment) -> RepoResult<Option<Blog>> {
        let sql = format!(
            "UPDATE blogs SET comments = comments || jsonb_build_array($2::jsonb), updated_at = $3 \
             WHERE id = $1 RETURNING {BLOG_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Blog>(&sql)
            .bind(blog_id)
            .bind(Json(comment))
            .bind(comment.created_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn remove_comment(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<Blog>> {
        let sql = format!(
            "UPDATE blogs SET comments = COALESCE(( \
                 SELECT jsonb_agg(c ORDER BY ord) \
                 FROM jsonb_array_elements(comments) WITH ORDINALITY AS t(c, ord) \
                 WHERE c->>'_id' <> $2::text), '[]'::jsonb), \
             updated_at = $3 \
             WHERE id = $1 AND comments @> jsonb_build_array(jsonb_build_object('_id', $2::text)) \
             RETURNING {BLOG_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Blog>(&sql)
            .bind(blog_id)
            .bind(comment_id.to_string())
            .bind(at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn push_reply(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        reply: &Reply,
    ) -> RepoResult<Option<Blog>> {
        let sql = format!(
            "UPDATE blogs SET comments = ( \
                 SELECT jsonb_agg(CASE WHEN c->>'_id' = $2::text \
                     THEN jsonb_set(c, '{{replies}}', \
                         COALESCE(c->'replies', '[]'::jsonb) || jsonb_build_array($3::jsonb)) \
                     ELSE c END ORDER BY ord) \
                 FROM jsonb_array_elements(comments) WITH ORDINALITY AS t(c, ord)), \
             updated_at = $4 \
             WHERE id = $1 AND comments @> jsonb_build_array(jsonb_build_object('_id', $2::text)) \
             RETURNING {BLOG_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Blog>(&sql)
            .bind(blog_id)
            .bind(comment_id.to_string())
            .bind(Json(reply))
            .bind(reply.created_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn remove_reply(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        reply_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<Blog>> {
        let sql = format!(
            "UPDATE blogs SET comments = ( \
                 SELECT jsonb_agg(CASE WHEN c->>'_id' = $2::text \
                     THEN jsonb_set(c, '{{replies}}', COALESCE(( \
                         SELECT jsonb_agg(r ORDER BY rord) \
                         FROM jsonb_array_elements(c->'replies') WITH ORDINALITY AS u(r, rord) \
                         WHERE r->>'_id' <> $3::text), '[]'::jsonb)) \
                     ELSE c END ORDER BY ord) \
                 FROM jsonb_array_elements(comments) WITH ORDINALITY AS t(c, ord)), \
             updated_at = $4 \
             WHERE id = $1 AND comments @> jsonb_build_array(jsonb_build_object( \
                 '_id', $2::text, \
                 'replies', jsonb_build_array(jsonb_build_object('_id', $3::text)))) \
             RETURNING {BLOG_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Blog>(&sql)
            .bind(blog_id)
            .bind(comment_id.to_string())
            .bind(reply_id.to_string())
            .bind(at)
            .fetch_optional(&self.pool)
            .await?)
    }

    // --- Courses ---

    async fn list_courses(&self, query: &CourseQuery) -> RepoResult<Vec<Course>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COURSE_COLUMNS} FROM courses WHERE TRUE"));

        if let Some(level) = &query.level {
            builder
                .push(" AND level = LOWER(")
                .push_bind(level.clone())
                .push(")");
        }
        if let Some(category) = &query.category {
            builder
                .push(" AND LOWER(category) = LOWER(")
                .push_bind(category.clone())
                .push(")");
        }
        if let Some(featured) = query.featured {
            builder.push(" AND featured = ").push_bind(featured);
        }
        builder.push(" ORDER BY created_at DESC");

        Ok(builder
            .build_query_as::<Course>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_course(&self, id: Uuid) -> RepoResult<Option<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_course(&self, course: &Course) -> RepoResult<Course> {
        let sql = format!(
            "INSERT INTO courses ({COURSE_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {COURSE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(course.id)
            .bind(&course.title)
            .bind(&course.description)
            .bind(Json(&course.instructor))
            .bind(course.price)
            .bind(&course.duration)
            .bind(course.level.as_str())
            .bind(&course.category)
            .bind(Json(&course.curriculum))
            .bind(course.featured)
            .bind(course.students_enrolled)
            .bind(&course.thumbnail)
            .bind(&course.preview_video)
            .bind(Json(&course.requirements))
            .bind(Json(&course.learning_outcomes))
            .bind(course.created_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn replace_course(&self, course: &Course) -> RepoResult<Option<Course>> {
        let sql = format!(
            "UPDATE courses SET title = $2, description = $3, instructor = $4, price = $5, \
             duration = $6, level = $7, category = $8, curriculum = $9, featured = $10, \
             thumbnail = $11, preview_video = $12, requirements = $13, learning_outcomes = $14 \
             WHERE id = $1 RETURNING {COURSE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(course.id)
            .bind(&course.title)
            .bind(&course.description)
            .bind(Json(&course.instructor))
            .bind(course.price)
            .bind(&course.duration)
            .bind(course.level.as_str())
            .bind(&course.category)
            .bind(Json(&course.curriculum))
            .bind(course.featured)
            .bind(&course.thumbnail)
            .bind(&course.preview_video)
            .bind(Json(&course.requirements))
            .bind(Json(&course.learning_outcomes))
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_course(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Shop ---

    async fn list_shop_items(&self, query: &ShopQuery) -> RepoResult<Vec<ShopItem>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {SHOP_COLUMNS} FROM shop_items WHERE TRUE"));

        match query.available {
            Some(true) => {
                builder.push(" AND available_quantity > 0");
            }
            Some(false) => {
                builder.push(" AND available_quantity = 0");
            }
            None => {}
        }
        if let Some(original) = query.original {
            builder.push(" AND is_original = ").push_bind(original);
        }
        builder.push(match query.sort {
            ShopSort::Newest => " ORDER BY created_at DESC",
            ShopSort::PriceAsc => " ORDER BY price ASC",
            ShopSort::PriceDesc => " ORDER BY price DESC",
        });

        Ok(builder
            .build_query_as::<ShopItem>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_shop_item(&self, id: Uuid) -> RepoResult<Option<ShopItem>> {
        let sql = format!("SELECT {SHOP_COLUMNS} FROM shop_items WHERE id = $1");
        Ok(sqlx::query_as::<_, ShopItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_shop_item(&self, item: &ShopItem) -> RepoResult<ShopItem> {
        let sql = format!(
            "INSERT INTO shop_items ({SHOP_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {SHOP_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, ShopItem>(&sql)
            .bind(item.id)
            .bind(item.artwork_id)
            .bind(item.price)
            .bind(&item.currency)
            .bind(item.available_quantity)
            .bind(item.is_original)
            .bind(Json(&item.print_sizes))
            .bind(Json(&item.framing_options))
            .bind(Json(&item.shipping_info))
            .bind(item.sold)
            .bind(item.created_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn replace_shop_item(&self, item: &ShopItem) -> RepoResult<Option<ShopItem>> {
        let sql = format!(
            "UPDATE shop_items SET artwork_id = $2, price = $3, currency = $4, \
             available_quantity = $5, is_original = $6, print_sizes = $7, framing_options = $8, \
             shipping_info = $9 WHERE id = $1 RETURNING {SHOP_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, ShopItem>(&sql)
            .bind(item.id)
            .bind(item.artwork_id)
            .bind(item.price)
            .bind(&item.currency)
            .bind(item.available_quantity)
            .bind(item.is_original)
            .bind(Json(&item.print_sizes))
            .bind(Json(&item.framing_options))
            .bind(Json(&item.shipping_info))
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_shop_item(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM shop_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Contacts ---

    async fn create_contact(&self, contact: &Contact) -> RepoResult<Contact> {
        let sql = format!(
            "INSERT INTO contacts ({CONTACT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {CONTACT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Contact>(&sql)
            .bind(contact.id)
            .bind(&contact.name)
            .bind(&contact.email)
            .bind(&contact.subject)
            .bind(&contact.message)
            .bind(contact.status.as_str())
            .bind(contact.created_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Contact>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn recent_contacts(&self, limit: usize) -> RepoResult<Vec<Contact>> {
        let sql =
            format!("SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at DESC LIMIT $1");
        Ok(sqlx::query_as::<_, Contact>(&sql)
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> RepoResult<Option<Contact>> {
        let sql =
            format!("UPDATE contacts SET status = $2 WHERE id = $1 RETURNING {CONTACT_COLUMNS}");
        Ok(sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_contact(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Subscribers ---

    async fn find_subscriber(&self, email: &str) -> RepoResult<Option<Subscriber>> {
        let sql = format!("SELECT {SUBSCRIBER_COLUMNS} FROM subscribers WHERE email = $1");
        Ok(sqlx::query_as::<_, Subscriber>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_subscriber(&self, subscriber: &Subscriber) -> RepoResult<Subscriber> {
        let sql = format!(
            "INSERT INTO subscribers ({SUBSCRIBER_COLUMNS}) VALUES ($1, $2, $3, $4) \
             RETURNING {SUBSCRIBER_COLUMNS}"
        );
        sqlx::query_as::<_, Subscriber>(&sql)
            .bind(subscriber.id)
            .bind(&subscriber.email)
            .bind(&subscriber.source)
            .bind(subscriber.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_violation(DUPLICATE_SUBSCRIBER))
    }

    async fn list_subscribers(&self) -> RepoResult<Vec<Subscriber>> {
        let sql = format!("SELECT {SUBSCRIBER_COLUMNS} FROM subscribers ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Subscriber>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_subscriber(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM subscribers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Admin ---

    async fn entity_counts(&self) -> RepoResult<EntityCounts> {
        let (users, artworks, blogs, courses, shop_items, contacts, subscribers): (
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM users), \
                (SELECT COUNT(*) FROM artworks), \
                (SELECT COUNT(*) FROM blogs), \
                (SELECT COUNT(*) FROM courses), \
                (SELECT COUNT(*) FROM shop_items), \
                (SELECT COUNT(*) FROM contacts), \
                (SELECT COUNT(*) FROM subscribers)",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(EntityCounts {
            users,
            artworks,
            blogs,
            courses,
            shop_items,
            contacts,
            subscribers,
        })
    }

    async fn bulk_delete(&self, kind: EntityKind, ids: &[Uuid]) -> RepoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        // The table name comes from the closed EntityKind set, never from the request.
        let sql = format!("DELETE FROM {} WHERE id = ANY($1)", kind.table());
        let result = sqlx::query(&sql).bind(ids).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }
}
