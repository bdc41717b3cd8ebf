use axum::{
    extract::{OriginalUri, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::ErrorResponse;

/// Fills `path` of any [`ErrorResponse`] produced further down the stack.
///
/// Uses [`OriginalUri`] when present so nested routers report the full path.
pub async fn attach_request_path(request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ErrorResponse>() {
        Some(body) if body.path.is_empty() => {
            let (mut parts, _) = response.into_parts();
            let mut rendered = body.with_path(path).into_response();
            // Preserve headers set by inner layers
            parts.headers.remove(axum::http::header::CONTENT_LENGTH);
            let headers = rendered.headers_mut();
            for name in parts.headers.keys() {
                if headers.contains_key(name) {
                    continue;
                }
                for value in parts.headers.get_all(name) {
                    headers.append(name.clone(), value.clone());
                }
            }
            rendered
        }
        Some(body) => {
            response.extensions_mut().insert(body);
            response
        }
        None => response,
    }
}
