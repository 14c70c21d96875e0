use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod services;
#[cfg(test)]
pub(crate) mod testing;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
