use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::StoreError;

/// Identity record. The password hash never leaves the server: it is
/// skipped on serialization, so handlers can return `User` directly.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Per-user career/social document. Experience and education entries are
/// prepended on insert (newest first) and removed by their local id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user: Uuid,
    pub status: String,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    #[serde(default)]
    pub social: SocialLinks,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    pub created_at: DateTime<Utc>,
}

/// Owner identity attached to profile reads. Unlike post and comment
/// snapshots this reflects the user record at request time, so a later
/// avatar change shows up on the profile card.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUser {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Profile as served by the read endpoints: the stored document with the
/// owner's current name and avatar joined in.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user: ProfileUser,
    pub status: String,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    pub social: SocialLinks,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub created_at: DateTime<Utc>,
}

impl ProfileView {
    pub fn new(profile: Profile, name: String, avatar: Option<String>) -> Self {
        Self {
            user: ProfileUser {
                id: profile.user,
                name,
                avatar,
            },
            status: profile.status,
            skills: profile.skills,
            company: profile.company,
            website: profile.website,
            location: profile.location,
            bio: profile.bio,
            githubusername: profile.githubusername,
            social: profile.social,
            experience: profile.experience,
            education: profile.education,
            created_at: profile.created_at,
        }
    }
}

/// Validated profile fields for an upsert. `status` and `skills` are always
/// applied; optional fields only overwrite when present, so repeated partial
/// updates never clobber earlier values.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub status: String,
    pub skills: Vec<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub social: SocialLinks,
}

#[derive(Debug, Clone)]
pub struct NewExperience {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewEducation {
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

impl Profile {
    pub fn new(user: Uuid, fields: ProfileFields) -> Self {
        let mut profile = Self {
            user,
            status: String::new(),
            skills: Vec::new(),
            company: None,
            website: None,
            location: None,
            bio: None,
            githubusername: None,
            social: SocialLinks::default(),
            experience: Vec::new(),
            education: Vec::new(),
            created_at: Utc::now(),
        };
        profile.apply(fields);
        profile
    }

    /// Merge upsert fields into the document. Omitted optional fields are
    /// left unchanged, including individual social links.
    pub fn apply(&mut self, fields: ProfileFields) {
        self.status = fields.status;
        self.skills = fields.skills;
        merge(&mut self.company, fields.company);
        merge(&mut self.website, fields.website);
        merge(&mut self.location, fields.location);
        merge(&mut self.bio, fields.bio);
        merge(&mut self.githubusername, fields.githubusername);
        merge(&mut self.social.youtube, fields.social.youtube);
        merge(&mut self.social.twitter, fields.social.twitter);
        merge(&mut self.social.facebook, fields.social.facebook);
        merge(&mut self.social.linkedin, fields.social.linkedin);
        merge(&mut self.social.instagram, fields.social.instagram);
    }

    pub fn push_experience(&mut self, entry: NewExperience) {
        self.experience.insert(
            0,
            Experience {
                id: Uuid::new_v4(),
                title: entry.title,
                company: entry.company,
                location: entry.location,
                from: entry.from,
                to: entry.to,
                current: entry.current,
                description: entry.description,
            },
        );
    }

    /// Removing an id that is not present is a no-op, not an error.
    pub fn remove_experience(&mut self, entry_id: Uuid) {
        self.experience.retain(|e| e.id != entry_id);
    }

    pub fn push_education(&mut self, entry: NewEducation) {
        self.education.insert(
            0,
            Education {
                id: Uuid::new_v4(),
                school: entry.school,
                degree: entry.degree,
                fieldofstudy: entry.fieldofstudy,
                from: entry.from,
                to: entry.to,
                current: entry.current,
                description: entry.description,
            },
        );
    }

    pub fn remove_education(&mut self, entry_id: Uuid) {
        self.education.retain(|e| e.id != entry_id);
    }
}

fn merge(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub user: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub text: String,
    pub date: DateTime<Utc>,
}

/// Short text post. Author name/avatar are snapshotted from the user record
/// at write time and never re-synced with later profile edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub text: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn new(author: &User, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: author.id,
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            text,
            date: Utc::now(),
            likes: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// At most one like per user; a duplicate is a conflict.
    pub fn like(&mut self, user_id: Uuid) -> Result<(), StoreError> {
        if self.likes.iter().any(|l| l.user == user_id) {
            return Err(StoreError::Conflict("post already liked by user".to_string()));
        }
        self.likes.insert(0, Like { user: user_id });
        Ok(())
    }

    pub fn unlike(&mut self, user_id: Uuid) -> Result<(), StoreError> {
        match self.likes.iter().position(|l| l.user == user_id) {
            Some(index) => {
                self.likes.remove(index);
                Ok(())
            }
            None => Err(StoreError::Conflict("post has not yet been liked".to_string())),
        }
    }

    pub fn comment(&mut self, author: &User, text: String) {
        self.comments.insert(
            0,
            Comment {
                id: Uuid::new_v4(),
                user: author.id,
                name: author.name.clone(),
                avatar: author.avatar.clone(),
                text,
                date: Utc::now(),
            },
        );
    }

    /// Only the comment's author may remove it.
    pub fn uncomment(&mut self, comment_id: Uuid, requesting_user: Uuid) -> Result<(), StoreError> {
        let comment = self
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .ok_or(StoreError::NotFound("comment"))?;
        if comment.user != requesting_user {
            return Err(StoreError::Forbidden("user not authorized".to_string()));
        }
        self.comments.retain(|c| c.id != comment_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "$2b$12$hash".to_string(),
            avatar: None,
            created_at: Utc::now(),
        }
    }

    fn fields(status: &str, skills: &[&str]) -> ProfileFields {
        ProfileFields {
            status: status.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn apply_leaves_omitted_fields_unchanged() {
        let mut profile = Profile::new(Uuid::new_v4(), ProfileFields {
            company: Some("Acme".to_string()),
            ..fields("dev", &["rust"])
        });

        profile.apply(fields("senior dev", &["rust", "go"]));
        assert_eq!(profile.status, "senior dev");
        assert_eq!(profile.skills, vec!["rust", "go"]);
        assert_eq!(profile.company.as_deref(), Some("Acme"));
    }

    #[test]
    fn experience_is_prepended_and_removed_by_id() {
        let mut profile = Profile::new(Uuid::new_v4(), fields("dev", &[]));
        for title in ["first", "second", "third"] {
            profile.push_experience(NewExperience {
                title: title.to_string(),
                company: "Acme".to_string(),
                location: None,
                from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                to: None,
                current: false,
                description: None,
            });
        }
        assert_eq!(profile.experience[0].title, "third");

        let middle = profile.experience[1].id;
        profile.remove_experience(middle);
        let titles: Vec<_> = profile.experience.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "first"]);

        // absent id is a no-op
        profile.remove_experience(Uuid::new_v4());
        assert_eq!(profile.experience.len(), 2);
    }

    #[test]
    fn double_like_is_a_conflict() {
        let author = test_user();
        let mut post = Post::new(&author, "hello".to_string());
        let liker = Uuid::new_v4();
        post.like(liker).unwrap();
        assert!(matches!(post.like(liker), Err(StoreError::Conflict(_))));
        assert_eq!(post.likes.len(), 1);
    }

    #[test]
    fn unlike_without_like_is_a_conflict() {
        let author = test_user();
        let mut post = Post::new(&author, "hello".to_string());
        assert!(matches!(post.unlike(Uuid::new_v4()), Err(StoreError::Conflict(_))));
    }

    #[test]
    fn only_the_comment_author_may_remove_it() {
        let author = test_user();
        let commenter = test_user();
        let mut post = Post::new(&author, "hello".to_string());
        post.comment(&commenter, "nice".to_string());
        let comment_id = post.comments[0].id;

        assert!(matches!(
            post.uncomment(comment_id, author.id),
            Err(StoreError::Forbidden(_))
        ));
        post.uncomment(comment_id, commenter.id).unwrap();
        assert!(post.comments.is_empty());
    }
}
