use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, ErrorResponse, IdPath, JsonBody,
    errors::responses::{BadRequestResponse, InternalServerErrorResponse, NotFoundResponse},
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::age::Clock;
use crate::error::UserResult;
use crate::models::{BirthDateRange, User, UserDto};
use crate::patch::UserPatch;
use crate::repository::UserRepository;
use crate::service::UserService;

const TAG: &str = "users";

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        users_by_birth_date_range,
        create_user,
        get_user,
        update_user,
        patch_user,
        delete_user,
    ),
    components(
        schemas(User, UserDto, UserPatch, ErrorResponse),
        responses(NotFoundResponse, BadRequestResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "User record endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<R, C> = State<Arc<UserService<R, C>>>;

/// Create the user router with all HTTP endpoints
pub fn router<R, C>(service: UserService<R, C>) -> Router
where
    R: UserRepository + 'static,
    C: Clock + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/",
            get(users_by_birth_date_range::<R, C>).post(create_user::<R, C>),
        )
        .route(
            "/{id}",
            get(get_user::<R, C>)
                .put(update_user::<R, C>)
                .patch(patch_user::<R, C>)
                .delete(delete_user::<R, C>),
        )
        .with_state(shared_service)
}

/// Users born within an inclusive date range
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(BirthDateRange),
    responses(
        (status = 200, description = "Users ordered by id", body = Vec<User>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn users_by_birth_date_range<R: UserRepository, C: Clock>(
    State(service): SharedService<R, C>,
    range: Result<Query<BirthDateRange>, QueryRejection>,
) -> Result<Json<Vec<User>>, AppError> {
    let Query(range) = range?;
    let users = service
        .users_by_birth_date_range(range.start_date, range.end_date)
        .await?;
    Ok(Json(users))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = UserDto,
    responses(
        (status = 201, description = "User created"),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository, C: Clock>(
    State(service): SharedService<R, C>,
    headers: HeaderMap,
    JsonBody(input): JsonBody<UserDto>,
) -> UserResult<StatusCode> {
    let user = service.create_user(input).await?;

    AuditEvent::new(
        "user.create",
        Some(format!("user:{}", user.id)),
        AuditOutcome::Success,
    )
    .with_request_headers(&headers)
    .log();

    Ok(StatusCode::CREATED)
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository, C: Clock>(
    State(service): SharedService<R, C>,
    IdPath(id): IdPath,
) -> UserResult<Json<User>> {
    let user = service.get_user(id).await?;
    Ok(Json(user))
}

/// Replace every field of a user
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UserDto,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository, C: Clock>(
    State(service): SharedService<R, C>,
    headers: HeaderMap,
    IdPath(id): IdPath,
    JsonBody(input): JsonBody<UserDto>,
) -> UserResult<StatusCode> {
    service.update_user(id, input).await?;

    AuditEvent::new("user.update", Some(format!("user:{}", id)), AuditOutcome::Success)
        .with_request_headers(&headers)
        .log();

    Ok(StatusCode::OK)
}

/// Change some fields of a user.
///
/// Keys are field names, unknown keys are ignored. Only `birthDate` is
/// checked; `null` clears `address` or `phoneNumber`.
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UserPatch,
    responses(
        (status = 200, description = "User patched"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn patch_user<R: UserRepository, C: Clock>(
    State(service): SharedService<R, C>,
    headers: HeaderMap,
    IdPath(id): IdPath,
    JsonBody(patch): JsonBody<UserPatch>,
) -> UserResult<StatusCode> {
    let fields = patch.fields();
    service.patch_user(id, patch).await?;

    AuditEvent::new("user.patch", Some(format!("user:{}", id)), AuditOutcome::Success)
        .with_request_headers(&headers)
        .with_details(json!({ "fields": fields }))
        .log();

    Ok(StatusCode::OK)
}

/// Delete a user. Absent ids succeed as well.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted or already absent"),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository, C: Clock>(
    State(service): SharedService<R, C>,
    headers: HeaderMap,
    IdPath(id): IdPath,
) -> UserResult<StatusCode> {
    service.delete_user(id).await?;

    AuditEvent::new("user.delete", Some(format!("user:{}", id)), AuditOutcome::Success)
        .with_request_headers(&headers)
        .log();

    Ok(StatusCode::OK)
}
