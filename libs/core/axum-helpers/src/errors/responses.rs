//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "timestamp": "2024-01-01T12:00:00.000000",
        "status": "Internal Server Error",
        "statusCode": 500,
        "messages": ["An unexpected error occurred."],
        "path": "/api/users/1"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - one message per problem",
    content_type = "application/json",
    example = json!({
        "timestamp": "2024-01-01T12:00:00.000000",
        "status": "Bad Request",
        "statusCode": 400,
        "messages": ["Wrong email format", "Last name may not be blank"],
        "path": "/api/users"
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "timestamp": "2024-01-01T12:00:00.000000",
        "status": "Not Found",
        "statusCode": 404,
        "messages": ["No user with id 999"],
        "path": "/api/users/999"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);
