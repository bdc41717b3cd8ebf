//! API routes module

pub mod health;
pub mod users;

use axum::Router;
use axum_helpers::{cors_layer_from_origins, create_router, health_router};

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/users", users::router(state))
}

/// Full application: API under `/api`, docs, health and readiness
pub fn app(state: &AppState) -> eyre::Result<Router> {
    let cors = if state.config.cors_origins.is_empty() {
        None
    } else {
        Some(cors_layer_from_origins(state.config.cors_origins.as_slice())?)
    };

    Ok(create_router::<ApiDoc>(routes(state), cors)
        .merge(health_router(state.config.app))
        .merge(health::router(state.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use core_config::{app_info, server::ServerConfig};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn state(cors_origins: Vec<String>) -> AppState {
        AppState {
            config: Config {
                app: app_info!(),
                environment: Environment::Development,
                server: ServerConfig::default(),
                allowed_age: 18,
                database: None,
                run_migrations: false,
                cors_origins,
            },
            db: None,
        }
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_users_are_served_under_api() {
        let app = app(&state(vec![])).unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "email": "a@b.com",
                    "firstName": "A",
                    "lastName": "B",
                    "birthDate": "2000-01-01"
                })
                .to_string(),
            ))
            .unwrap();
        let (status, _) = call(app.clone(), request).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(app, get("/api/users/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "a@b.com");
    }

    #[tokio::test]
    async fn test_error_path_is_the_full_request_path() {
        let app = app(&state(vec![])).unwrap();

        let (status, body) = call(app, get("/api/users/42")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], "/api/users/42");
        assert_eq!(body["messages"], json!(["No user with id 42"]));
    }

    #[tokio::test]
    async fn test_unknown_route_uses_error_body() {
        let app = app(&state(vec![])).unwrap();

        let (status, body) = call(app, get("/nope")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["path"], "/nope");
    }

    #[tokio::test]
    async fn test_health_and_ready_without_database() {
        let app = app(&state(vec![])).unwrap();

        let (status, body) = call(app.clone(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "users_api");

        let (status, body) = call(app, get("/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn test_openapi_document_lists_user_paths() {
        let app = app(&state(vec![])).unwrap();

        let (status, body) = call(app, get("/api-docs/openapi.json")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/users"].is_object());
        assert!(body["paths"]["/api/users/{id}"]["patch"].is_object());
    }

    #[test]
    fn test_invalid_cors_origin_fails() {
        let result = app(&state(vec!["bad\norigin".to_string()]));
        assert!(result.is_err());
    }
}
