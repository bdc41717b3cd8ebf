//! Users Domain
//!
//! Stored user records with field validation, a minimum-age rule and
//! partial updates.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, audit events
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, age rule, patch engine
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory and PostgreSQL)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Records, DTOs, SeaORM entity
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     AgeRule,
//!     handlers,
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//! };
//!
//! // Create repository and service
//! let repository = InMemoryUserRepository::new();
//! let service = UserService::new(repository, AgeRule::new(18));
//!
//! // Create Axum router
//! let router = handlers::router(service);
//! ```

pub mod age;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod patch;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use age::{AgeRule, Clock, FixedClock, SystemClock};
pub use error::{UserError, UserResult};
pub use models::{BirthDateRange, NewUser, User, UserDto};
pub use patch::UserPatch;
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
