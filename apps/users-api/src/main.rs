//! Users API - REST server for user records

use axum_helpers::server::create_production_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{self, DatabaseConnection};
use migration::Migrator;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = match config.database.clone() {
        Some(database) => Some(connect(database, &config).await?),
        None => None,
    };

    let state = AppState {
        config: config.clone(),
        db,
    };

    let app = api::app(&state)?;

    info!(
        "Starting {} v{} on port {} (allowed age {})",
        config.app.name, config.app.version, config.server.port, config.allowed_age
    );

    create_production_app(
        app,
        &config.server,
        Duration::from_secs(30),
        async move {
            if let Some(db) = state.db {
                info!("Shutting down: closing PostgreSQL connections");
                if let Err(e) = db.close().await {
                    tracing::error!("Failed to close PostgreSQL pool: {}", e);
                }
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}

async fn connect(
    database: postgres::PostgresConfig,
    config: &Config,
) -> eyre::Result<DatabaseConnection> {
    let db = postgres::connect_from_config(database).await?;

    if config.run_migrations {
        postgres::run_migrations::<Migrator>(&db, config.app.name).await?;
    } else {
        info!("RUN_MIGRATIONS=false, skipping migrations");
    }

    Ok(db)
}
