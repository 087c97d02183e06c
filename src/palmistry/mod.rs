use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod generator;
pub mod handlers;
pub mod payment;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    handlers::palmistry_routes()
}
