use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenService;
use crate::github::GithubClient;
use crate::handlers::{auth, posts, profile, users};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub github: GithubClient,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Registration and sessions
        .route("/api/users", post(users::register))
        .route("/api/auth", get(auth::current_user).post(auth::login))
        // Profiles
        .route(
            "/api/profile",
            get(profile::list).post(profile::upsert).delete(profile::delete_account),
        )
        .route("/api/profile/me", get(profile::me))
        .route("/api/profile/user/:user_id", get(profile::by_user))
        .route("/api/profile/github/:username", get(profile::github_repos))
        .route(
            "/api/profile/experience",
            put(profile::add_experience).delete(profile::remove_experience),
        )
        .route(
            "/api/profile/education",
            put(profile::add_education).delete(profile::remove_education),
        )
        // Posts
        .route("/api/posts", get(posts::list).post(posts::create))
        .route("/api/posts/:post_id", get(posts::get_one).delete(posts::delete))
        .route("/api/posts/like/:post_id", put(posts::like))
        .route("/api/posts/unlike/:post_id", delete(posts::unlike))
        .route("/api/posts/comment/:post_id", put(posts::comment))
        .route("/api/posts/uncomment/:post_id/:comment_id", delete(posts::uncomment))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "devconnect-api",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "users": "/api/users (public - registration)",
            "auth": "/api/auth (login, current user)",
            "profile": "/api/profile[/me, /user/:user_id, /experience, /education, /github/:username]",
            "posts": "/api/posts[/:post_id, /like, /unlike, /comment, /uncomment]",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "timestamp": now })),
            )
        }
    }
}
