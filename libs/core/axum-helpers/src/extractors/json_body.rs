//! JSON body extractor that reports failures as [`AppError`].

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

/// Drop-in replacement for [`axum::Json`] on the request side.
///
/// Malformed JSON, a wrong content type or a type mismatch all become a
/// 400 with the standard error body.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::JsonBody;
///
/// async fn create_user(JsonBody(payload): JsonBody<UserDto>) -> StatusCode {
///     StatusCode::CREATED
/// }
/// ```
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{StatusCode, header},
        routing::post,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Payload {
        name: String,
    }

    async fn echo(JsonBody(payload): JsonBody<Payload>) -> String {
        payload.name
    }

    fn request(body: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_accepts_valid_json() {
        let app = Router::new().route("/", post(echo));
        let response = app.oneshot(request(r#"{"name":"ada"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = Router::new().route("/", post(echo));
        let response = app.oneshot(request(r#"{"name":"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_bad_request() {
        let app = Router::new().route("/", post(echo));
        let response = app.oneshot(request(r#"{"name":[1,2]}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
