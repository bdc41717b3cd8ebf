//! PostgreSQL connectivity for the user manager services.
//!
//! # Features
//!
//! - `postgres` (default) - SeaORM connection, migrations and health checks
//! - `config` (default) - `core_config::FromEnv` support for [`postgres::PostgresConfig`]
//!
//! # Example
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config(PostgresConfig::from_env()?).await?;
//! postgres::run_migrations::<Migrator>(&db, "users_api").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
