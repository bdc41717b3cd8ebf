//! Configuration for Users API

use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_optional, env_parse, server::ServerConfig,
};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    /// Minimum age in whole years
    pub allowed_age: u32,
    /// `None` keeps records in memory
    pub database: Option<PostgresConfig>,
    pub run_migrations: bool,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let allowed_age = env_parse("ALLOWED_AGE", "18")?;

        let database = env_optional("DATABASE_URL")
            .map(|_| PostgresConfig::from_env())
            .transpose()?;
        let run_migrations = env_parse("RUN_MIGRATIONS", "true")?;

        let cors_origins = env_optional("CORS_ALLOWED_ORIGIN")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            allowed_age,
            database,
            run_migrations,
            cors_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 5] = [
        "ALLOWED_AGE",
        "DATABASE_URL",
        "RUN_MIGRATIONS",
        "CORS_ALLOWED_ORIGIN",
        "PORT",
    ];

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(VARS, || {
            let config = Config::from_env().unwrap();

            assert_eq!(config.allowed_age, 18);
            assert!(config.database.is_none());
            assert!(config.run_migrations);
            assert!(config.cors_origins.is_empty());
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.app.name, "users_api");
        });
    }

    #[test]
    fn test_reads_overrides() {
        temp_env::with_vars(
            [
                ("ALLOWED_AGE", Some("21")),
                ("DATABASE_URL", Some("postgresql://localhost/users")),
                ("RUN_MIGRATIONS", Some("false")),
                (
                    "CORS_ALLOWED_ORIGIN",
                    Some("http://localhost:3000, https://example.com,"),
                ),
                ("PORT", Some("9000")),
            ],
            || {
                let config = Config::from_env().unwrap();

                assert_eq!(config.allowed_age, 21);
                assert_eq!(
                    config.database.as_ref().map(PostgresConfig::url),
                    Some("postgresql://localhost/users")
                );
                assert!(!config.run_migrations);
                assert_eq!(
                    config.cors_origins,
                    vec!["http://localhost:3000", "https://example.com"]
                );
                assert_eq!(config.server.port, 9000);
            },
        );
    }

    #[test]
    fn test_invalid_allowed_age_fails() {
        temp_env::with_var("ALLOWED_AGE", Some("eighteen"), || {
            let result = Config::from_env();
            assert!(matches!(result, Err(ConfigError::ParseError { ref key, .. }) if key == "ALLOWED_AGE"));
        });
    }

    #[test]
    fn test_blank_database_url_means_in_memory() {
        temp_env::with_var("DATABASE_URL", Some("  "), || {
            let config = Config::from_env().unwrap();
            assert!(config.database.is_none());
        });
    }
}
