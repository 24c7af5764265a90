pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use models::{
    Comment, Education, Experience, Like, NewEducation, NewExperience, Post, Profile,
    ProfileFields, ProfileUser, ProfileView, SocialLinks, User,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Document store behind the request gateway. Each method is one atomic
/// operation: implementations must not let two concurrent mutations of the
/// same document overwrite each other (the in-memory store holds a single
/// write lock, the Postgres store locks the row inside a transaction).
#[async_trait]
pub trait Store: Send + Sync {
    // Credential store
    async fn create_user(
        &self,
        name: String,
        email: String,
        password_hash: String,
        avatar: Option<String>,
    ) -> Result<User, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_id(&self, id: Uuid) -> Result<User, StoreError>;

    // Profile store. Reads join the owner's current name and avatar onto the
    // document; mutations return the bare document.
    async fn profile_by_user(&self, user_id: Uuid) -> Result<ProfileView, StoreError>;
    async fn list_profiles(&self) -> Result<Vec<ProfileView>, StoreError>;
    async fn upsert_profile(&self, user_id: Uuid, fields: ProfileFields)
        -> Result<Profile, StoreError>;
    async fn add_experience(&self, user_id: Uuid, entry: NewExperience)
        -> Result<Profile, StoreError>;
    async fn remove_experience(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Vec<Experience>, StoreError>;
    async fn add_education(&self, user_id: Uuid, entry: NewEducation)
        -> Result<Profile, StoreError>;
    async fn remove_education(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Vec<Education>, StoreError>;
    /// Removes the profile, the user record, and the user's posts in one
    /// logical operation (posts are cascaded deliberately, see DESIGN.md).
    async fn delete_account(&self, user_id: Uuid) -> Result<(), StoreError>;

    // Post store
    async fn create_post(&self, user_id: Uuid, text: String) -> Result<Post, StoreError>;
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
    async fn post_by_id(&self, id: Uuid) -> Result<Post, StoreError>;
    async fn delete_post(&self, id: Uuid, requesting_user: Uuid) -> Result<(), StoreError>;
    async fn add_like(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError>;
    async fn remove_like(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError>;
    async fn add_comment(
        &self,
        id: Uuid,
        user_id: Uuid,
        text: String,
    ) -> Result<Vec<Comment>, StoreError>;
    async fn remove_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
        requesting_user: Uuid,
    ) -> Result<Vec<Comment>, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
