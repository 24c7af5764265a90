use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;

use super::models::{
    Comment, Education, Experience, Like, NewEducation, NewExperience, Post, Profile,
    ProfileFields, ProfileView, User,
};
use super::{Store, StoreError};

/// Postgres-backed store. Users live in a plain table; profiles and posts are
/// kept as JSONB documents keyed by owner/post id. Read-modify-write on a
/// document happens inside a transaction with `SELECT ... FOR UPDATE`, so
/// concurrent mutations of the same document serialize instead of racing.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        info!("connected to database");
        Ok(Self { pool })
    }

    /// Create tables when they do not exist yet. Idempotent.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                avatar TEXT,
                created_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // Email uniqueness is case-insensitive, matching the lookup below.
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS users_email_lower_idx
             ON users (lower(email))",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS profiles (
                user_id UUID PRIMARY KEY,
                doc JSONB NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS posts (
                id UUID PRIMARY KEY,
                author UUID NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                doc JSONB NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lock a profile row for the rest of the transaction.
    async fn profile_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
    ) -> Result<Profile, StoreError> {
        let row: Option<(Json<Profile>,)> =
            sqlx::query_as("SELECT doc FROM profiles WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;
        row.map(|(Json(profile),)| profile)
            .ok_or(StoreError::NotFound("profile"))
    }

    async fn save_profile(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        profile: &Profile,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE profiles SET doc = $2 WHERE user_id = $1")
            .bind(profile.user)
            .bind(Json(profile))
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Lock a post row for the rest of the transaction.
    async fn post_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> Result<Post, StoreError> {
        let row: Option<(Json<Post>,)> =
            sqlx::query_as("SELECT doc FROM posts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
        row.map(|(Json(post),)| post).ok_or(StoreError::NotFound("post"))
    }

    async fn save_post(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        post: &Post,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE posts SET doc = $2 WHERE id = $1")
            .bind(post.id)
            .bind(Json(post))
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

const USER_COLUMNS: &str = "id, name, email, password, avatar, created_at";

#[async_trait]
impl Store for PgStore {
    async fn create_user(
        &self,
        name: String,
        email: String,
        password_hash: String,
        avatar: Option<String>,
    ) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password: password_hash,
            avatar,
            created_at: Utc::now(),
        };
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, password, avatar, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.avatar)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Conflict("user already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("user"))
    }

    async fn profile_by_user(&self, user_id: Uuid) -> Result<ProfileView, StoreError> {
        let row: Option<(Json<Profile>, String, Option<String>)> = sqlx::query_as(
            "SELECT p.doc, u.name, u.avatar FROM profiles p
             JOIN users u ON u.id = p.user_id
             WHERE p.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|(Json(profile), name, avatar)| ProfileView::new(profile, name, avatar))
            .ok_or(StoreError::NotFound("profile"))
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileView>, StoreError> {
        let rows: Vec<(Json<Profile>, String, Option<String>)> = sqlx::query_as(
            "SELECT p.doc, u.name, u.avatar FROM profiles p
             JOIN users u ON u.id = p.user_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(Json(profile), name, avatar)| ProfileView::new(profile, name, avatar))
            .collect())
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        fields: ProfileFields,
    ) -> Result<Profile, StoreError> {
        let mut tx = self.pool.begin().await?;
        // A still-valid token can outlive its account; refuse to recreate
        // state for a deleted user.
        let owner: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if owner.is_none() {
            return Err(StoreError::NotFound("user"));
        }
        let profile = match Self::profile_for_update(&mut tx, user_id).await {
            Ok(mut existing) => {
                existing.apply(fields);
                existing
            }
            Err(StoreError::NotFound(_)) => Profile::new(user_id, fields),
            Err(e) => return Err(e),
        };
        sqlx::query(
            "INSERT INTO profiles (user_id, doc) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET doc = EXCLUDED.doc",
        )
        .bind(user_id)
        .bind(Json(&profile))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn add_experience(
        &self,
        user_id: Uuid,
        entry: NewExperience,
    ) -> Result<Profile, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut profile = Self::profile_for_update(&mut tx, user_id).await?;
        profile.push_experience(entry);
        Self::save_profile(&mut tx, &profile).await?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn remove_experience(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Vec<Experience>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut profile = Self::profile_for_update(&mut tx, user_id).await?;
        profile.remove_experience(entry_id);
        Self::save_profile(&mut tx, &profile).await?;
        tx.commit().await?;
        Ok(profile.experience)
    }

    async fn add_education(
        &self,
        user_id: Uuid,
        entry: NewEducation,
    ) -> Result<Profile, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut profile = Self::profile_for_update(&mut tx, user_id).await?;
        profile.push_education(entry);
        Self::save_profile(&mut tx, &profile).await?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn remove_education(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Vec<Education>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut profile = Self::profile_for_update(&mut tx, user_id).await?;
        profile.remove_education(entry_id);
        Self::save_profile(&mut tx, &profile).await?;
        tx.commit().await?;
        Ok(profile.education)
    }

    async fn delete_account(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM posts WHERE author = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn create_post(&self, user_id: Uuid, text: String) -> Result<Post, StoreError> {
        let author = self.user_by_id(user_id).await?;
        let post = Post::new(&author, text);
        sqlx::query("INSERT INTO posts (id, author, created_at, doc) VALUES ($1, $2, $3, $4)")
            .bind(post.id)
            .bind(post.user)
            .bind(post.date)
            .bind(Json(&post))
            .execute(&self.pool)
            .await?;
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let rows: Vec<(Json<Post>,)> =
            sqlx::query_as("SELECT doc FROM posts ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(Json(post),)| post).collect())
    }

    async fn post_by_id(&self, id: Uuid) -> Result<Post, StoreError> {
        let row: Option<(Json<Post>,)> = sqlx::query_as("SELECT doc FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|(Json(post),)| post).ok_or(StoreError::NotFound("post"))
    }

    async fn delete_post(&self, id: Uuid, requesting_user: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let post = Self::post_for_update(&mut tx, id).await?;
        if post.user != requesting_user {
            return Err(StoreError::Forbidden("user not authorized".to_string()));
        }
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn add_like(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut post = Self::post_for_update(&mut tx, id).await?;
        post.like(user_id)?;
        Self::save_post(&mut tx, &post).await?;
        tx.commit().await?;
        Ok(post.likes)
    }

    async fn remove_like(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut post = Self::post_for_update(&mut tx, id).await?;
        post.unlike(user_id)?;
        Self::save_post(&mut tx, &post).await?;
        tx.commit().await?;
        Ok(post.likes)
    }

    async fn add_comment(
        &self,
        id: Uuid,
        user_id: Uuid,
        text: String,
    ) -> Result<Vec<Comment>, StoreError> {
        let author = self.user_by_id(user_id).await?;
        let mut tx = self.pool.begin().await?;
        let mut post = Self::post_for_update(&mut tx, id).await?;
        post.comment(&author, text);
        Self::save_post(&mut tx, &post).await?;
        tx.commit().await?;
        Ok(post.comments)
    }

    async fn remove_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
        requesting_user: Uuid,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut post = Self::post_for_update(&mut tx, id).await?;
        post.uncomment(comment_id, requesting_user)?;
        Self::save_post(&mut tx, &post).await?;
        tx.commit().await?;
        Ok(post.comments)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
