//! Users API routes

use axum::Router;
use domain_users::{AgeRule, InMemoryUserRepository, PgUserRepository, UserService, handlers};

use crate::state::AppState;

/// Create users router, backed by PostgreSQL when a connection is configured
pub fn router(state: &AppState) -> Router {
    let rule = AgeRule::new(state.config.allowed_age);

    match &state.db {
        Some(db) => {
            let repository = PgUserRepository::new(db.clone());
            handlers::router(UserService::new(repository, rule))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, user records are kept in memory");
            handlers::router(UserService::new(InMemoryUserRepository::new(), rule))
        }
    }
}
