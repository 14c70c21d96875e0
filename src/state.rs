use std::sync::Arc;

use sqlx::PgPool;

use crate::users::repo::{PgUserRepository, UserRepository};

/// Handles shared by every request. Built once in `main` and cloned into handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(db: PgPool) -> Self {
        Self::from_parts(Arc::new(PgUserRepository::new(db)))
    }

    pub fn from_parts(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}
