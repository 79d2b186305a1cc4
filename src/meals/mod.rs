pub mod commands;
mod dto;
pub mod handlers;
mod locks;
pub mod repo;
pub mod repo_types;
pub mod saga;
pub mod services;
mod validation;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
