use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    Comment, Education, Experience, Like, NewEducation, NewExperience, Post, Profile,
    ProfileFields, ProfileView, User,
};
use super::{Store, StoreError};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>,
    posts: HashMap<Uuid, Post>,
}

/// In-memory store used by the test suite. Every operation takes the write
/// lock once, so each mutation is atomic with respect to the others.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(
        &self,
        name: String,
        email: String,
        password_hash: String,
        avatar: Option<String>,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email.eq_ignore_ascii_case(&email)) {
            return Err(StoreError::Conflict("user already exists".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password: password_hash,
            avatar,
            created_at: chrono::Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        let inner = self.inner.read().await;
        inner.users.get(&id).cloned().ok_or(StoreError::NotFound("user"))
    }

    async fn profile_by_user(&self, user_id: Uuid) -> Result<ProfileView, StoreError> {
        let inner = self.inner.read().await;
        let profile = inner
            .profiles
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::NotFound("profile"))?;
        let owner = inner
            .users
            .get(&user_id)
            .ok_or(StoreError::NotFound("profile"))?;
        Ok(ProfileView::new(profile, owner.name.clone(), owner.avatar.clone()))
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileView>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .profiles
            .values()
            .filter_map(|profile| {
                inner.users.get(&profile.user).map(|owner| {
                    ProfileView::new(profile.clone(), owner.name.clone(), owner.avatar.clone())
                })
            })
            .collect())
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        fields: ProfileFields,
    ) -> Result<Profile, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user_id) {
            return Err(StoreError::NotFound("user"));
        }
        let profile = match inner.profiles.get_mut(&user_id) {
            Some(existing) => {
                existing.apply(fields);
                existing.clone()
            }
            None => {
                let created = Profile::new(user_id, fields);
                inner.profiles.insert(user_id, created.clone());
                created
            }
        };
        Ok(profile)
    }

    async fn add_experience(
        &self,
        user_id: Uuid,
        entry: NewExperience,
    ) -> Result<Profile, StoreError> {
        let mut inner = self.inner.write().await;
        let profile = inner
            .profiles
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound("profile"))?;
        profile.push_experience(entry);
        Ok(profile.clone())
    }

    async fn remove_experience(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Vec<Experience>, StoreError> {
        let mut inner = self.inner.write().await;
        let profile = inner
            .profiles
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound("profile"))?;
        profile.remove_experience(entry_id);
        Ok(profile.experience.clone())
    }

    async fn add_education(
        &self,
        user_id: Uuid,
        entry: NewEducation,
    ) -> Result<Profile, StoreError> {
        let mut inner = self.inner.write().await;
        let profile = inner
            .profiles
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound("profile"))?;
        profile.push_education(entry);
        Ok(profile.clone())
    }

    async fn remove_education(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Vec<Education>, StoreError> {
        let mut inner = self.inner.write().await;
        let profile = inner
            .profiles
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound("profile"))?;
        profile.remove_education(entry_id);
        Ok(profile.education.clone())
    }

    async fn delete_account(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.profiles.remove(&user_id);
        inner.posts.retain(|_, post| post.user != user_id);
        inner.users.remove(&user_id);
        Ok(())
    }

    async fn create_post(&self, user_id: Uuid, text: String) -> Result<Post, StoreError> {
        let mut inner = self.inner.write().await;
        let author = inner.users.get(&user_id).ok_or(StoreError::NotFound("user"))?;
        let post = Post::new(author, text);
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let inner = self.inner.read().await;
        let mut posts: Vec<Post> = inner.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    async fn post_by_id(&self, id: Uuid) -> Result<Post, StoreError> {
        let inner = self.inner.read().await;
        inner.posts.get(&id).cloned().ok_or(StoreError::NotFound("post"))
    }

    async fn delete_post(&self, id: Uuid, requesting_user: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let post = inner.posts.get(&id).ok_or(StoreError::NotFound("post"))?;
        if post.user != requesting_user {
            return Err(StoreError::Forbidden("user not authorized".to_string()));
        }
        inner.posts.remove(&id);
        Ok(())
    }

    async fn add_like(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError> {
        let mut inner = self.inner.write().await;
        let post = inner.posts.get_mut(&id).ok_or(StoreError::NotFound("post"))?;
        post.like(user_id)?;
        Ok(post.likes.clone())
    }

    async fn remove_like(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError> {
        let mut inner = self.inner.write().await;
        let post = inner.posts.get_mut(&id).ok_or(StoreError::NotFound("post"))?;
        post.unlike(user_id)?;
        Ok(post.likes.clone())
    }

    async fn add_comment(
        &self,
        id: Uuid,
        user_id: Uuid,
        text: String,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut inner = self.inner.write().await;
        let author = inner
            .users
            .get(&user_id)
            .ok_or(StoreError::NotFound("user"))?
            .clone();
        let post = inner.posts.get_mut(&id).ok_or(StoreError::NotFound("post"))?;
        post.comment(&author, text);
        Ok(post.comments.clone())
    }

    async fn remove_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
        requesting_user: Uuid,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut inner = self.inner.write().await;
        let post = inner.posts.get_mut(&id).ok_or(StoreError::NotFound("post"))?;
        post.uncomment(comment_id, requesting_user)?;
        Ok(post.comments.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
