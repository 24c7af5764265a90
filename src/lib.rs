pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod github;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod store;
