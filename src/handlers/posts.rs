use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::routes::AppState;
use crate::store::{Comment, Like, Post};

use super::non_blank;

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub text: Option<String>,
}

// Malformed ids read the same as unknown ones.
fn parse_post_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found("post not found"))
}

/// POST /api/posts - create a post; author name/avatar are snapshotted from
/// the current user record.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<PostRequest>,
) -> Result<Json<Post>, ApiError> {
    let text = non_blank(req.text).ok_or_else(|| ApiError::validation(["text is required"]))?;
    let post = state.store.create_post(user.id, text).await?;
    Ok(Json(post))
}

/// GET /api/posts - all posts, newest first.
pub async fn list(State(state): State<AppState>, _user: AuthUser) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state.store.list_posts().await?;
    Ok(Json(posts))
}

/// GET /api/posts/:post_id
pub async fn get_one(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = state.store.post_by_id(parse_post_id(&post_id)?).await?;
    Ok(Json(post))
}

/// DELETE /api/posts/:post_id - authors may delete their own posts only.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_post(parse_post_id(&post_id)?, user.id).await?;
    Ok(Json(json!({ "msg": "post removed" })))
}

/// PUT /api/posts/like/:post_id - returns the updated like sequence.
pub async fn like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let likes = state.store.add_like(parse_post_id(&post_id)?, user.id).await?;
    Ok(Json(likes))
}

/// DELETE /api/posts/unlike/:post_id
pub async fn unlike(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let likes = state.store.remove_like(parse_post_id(&post_id)?, user.id).await?;
    Ok(Json(likes))
}

/// PUT /api/posts/comment/:post_id - returns the updated comment sequence.
pub async fn comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<String>,
    ApiJson(req): ApiJson<PostRequest>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let text = non_blank(req.text).ok_or_else(|| ApiError::validation(["text is required"]))?;
    let comments = state
        .store
        .add_comment(parse_post_id(&post_id)?, user.id, text)
        .await?;
    Ok(Json(comments))
}

/// DELETE /api/posts/uncomment/:post_id/:comment_id - comment authors only.
pub async fn uncomment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comment_id = comment_id
        .parse::<Uuid>()
        .map_err(|_| ApiError::not_found("comment not found"))?;
    let comments = state
        .store
        .remove_comment(parse_post_id(&post_id)?, comment_id, user.id)
        .await?;
    Ok(Json(comments))
}
