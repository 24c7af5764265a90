use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::github::RepoSummary;
use crate::middleware::AuthUser;
use crate::routes::AppState;
use crate::store::{
    Education, Experience, NewEducation, NewExperience, Profile, ProfileFields, ProfileView,
    SocialLinks,
};

use super::non_blank;

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub status: Option<String>,
    pub skills: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

/// GET /api/profile/me - the caller's own profile, owner identity attached.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = state.store.profile_by_user(user.id).await?;
    Ok(Json(profile))
}

/// GET /api/profile - all profiles, public.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProfileView>>, ApiError> {
    let profiles = state.store.list_profiles().await?;
    Ok(Json(profiles))
}

/// GET /api/profile/user/:user_id - profile by user id, public. A malformed
/// id reads the same as an unknown one.
pub async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let user_id = user_id
        .parse::<Uuid>()
        .map_err(|_| ApiError::not_found("profile not found"))?;
    let profile = state.store.profile_by_user(user_id).await?;
    Ok(Json(profile))
}

/// POST /api/profile - create or partially update the caller's profile.
/// `status` and `skills` are required; skills arrive comma-separated and are
/// split and trimmed, without deduplication.
pub async fn upsert(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut errors = Vec::new();
    let status = non_blank(req.status);
    if status.is_none() {
        errors.push("status is required");
    }
    let skills = non_blank(req.skills);
    if skills.is_none() {
        errors.push("skills is required");
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let fields = ProfileFields {
        status: status.unwrap(),
        skills: skills
            .unwrap()
            .split(',')
            .map(|s| s.trim().to_string())
            .collect(),
        company: non_blank(req.company),
        website: non_blank(req.website),
        location: non_blank(req.location),
        bio: non_blank(req.bio),
        githubusername: non_blank(req.githubusername),
        social: SocialLinks {
            youtube: non_blank(req.youtube),
            twitter: non_blank(req.twitter),
            facebook: non_blank(req.facebook),
            linkedin: non_blank(req.linkedin),
            instagram: non_blank(req.instagram),
        },
    };

    let profile = state.store.upsert_profile(user.id, fields).await?;
    Ok(Json(profile))
}

/// DELETE /api/profile - delete profile, user, and the user's posts.
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_account(user.id).await?;
    Ok(Json(json!({ "msg": "user removed" })))
}

#[derive(Debug, Deserialize)]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

/// PUT /api/profile/experience - prepend an experience entry.
pub async fn add_experience(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<ExperienceRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut errors = Vec::new();
    let title = non_blank(req.title);
    if title.is_none() {
        errors.push("title is required");
    }
    let company = non_blank(req.company);
    if company.is_none() {
        errors.push("company is required");
    }
    if req.from.is_none() {
        errors.push("from date is required");
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let entry = NewExperience {
        title: title.unwrap(),
        company: company.unwrap(),
        location: non_blank(req.location),
        from: req.from.unwrap(),
        to: req.to,
        current: req.current,
        description: non_blank(req.description),
    };
    let profile = state.store.add_experience(user.id, entry).await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct RemoveExperienceQuery {
    pub exp_id: Option<Uuid>,
}

/// DELETE /api/profile/experience?exp_id= - remove an entry by id; an absent
/// id leaves the sequence unchanged.
pub async fn remove_experience(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<RemoveExperienceQuery>,
) -> Result<Json<Vec<Experience>>, ApiError> {
    let exp_id = query
        .exp_id
        .ok_or_else(|| ApiError::validation(["exp_id is required"]))?;
    let experience = state.store.remove_experience(user.id, exp_id).await?;
    Ok(Json(experience))
}

#[derive(Debug, Deserialize)]
pub struct EducationRequest {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub fieldofstudy: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

/// PUT /api/profile/education - prepend an education entry.
pub async fn add_education(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<EducationRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut errors = Vec::new();
    let school = non_blank(req.school);
    if school.is_none() {
        errors.push("school is required");
    }
    let degree = non_blank(req.degree);
    if degree.is_none() {
        errors.push("degree is required");
    }
    let fieldofstudy = non_blank(req.fieldofstudy);
    if fieldofstudy.is_none() {
        errors.push("fieldofstudy is required");
    }
    if req.from.is_none() {
        errors.push("from date is required");
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let entry = NewEducation {
        school: school.unwrap(),
        degree: degree.unwrap(),
        fieldofstudy: fieldofstudy.unwrap(),
        from: req.from.unwrap(),
        to: req.to,
        current: req.current,
        description: non_blank(req.description),
    };
    let profile = state.store.add_education(user.id, entry).await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct RemoveEducationQuery {
    pub edu_id: Option<Uuid>,
}

/// DELETE /api/profile/education?edu_id= - remove an entry by id.
pub async fn remove_education(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<RemoveEducationQuery>,
) -> Result<Json<Vec<Education>>, ApiError> {
    let edu_id = query
        .edu_id
        .ok_or_else(|| ApiError::validation(["edu_id is required"]))?;
    let education = state.store.remove_education(user.id, edu_id).await?;
    Ok(Json(education))
}

/// GET /api/profile/github/:username - the user's five newest public repos.
pub async fn github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<RepoSummary>>, ApiError> {
    let repos = state.github.recent_repos(&username).await?;
    Ok(Json(repos))
}
