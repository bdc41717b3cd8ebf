//! Application state management

use database::postgres::DatabaseConnection;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Absent when records are kept in memory
    pub db: Option<DatabaseConnection>,
}
