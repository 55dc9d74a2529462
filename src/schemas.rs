use accounts::{AccountError, UserManager};
use axum::{http::StatusCode, response::Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{OpenApi, ToSchema};

use crate::handlers::users::{
    AvatarUploadRequest, CreateUserRequest, UpdateUserRequest, UserResponse,
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Account factory and record operations
    pub users: UserManager,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }

    /// Map an account operation failure to a status code and stable error code.
    pub fn from_account_error(err: AccountError) -> ApiError {
        let (status, code) = match &err {
            AccountError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AccountError::EmailTaken(_) => (StatusCode::CONFLICT, "EMAIL_ALREADY_EXISTS"),
            AccountError::NotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            AccountError::PasswordHash(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PASSWORD_HASH_ERROR")
            }
            AccountError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Account operation failed: {}", err);
            "Internal server error".to_string()
        } else {
            err.to_string()
        };

        (status, Json(Self::new(message, code)))
    }
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::upload_avatar,
        crate::handlers::subscriptions::subscribe,
        crate::handlers::subscriptions::unsubscribe,
        crate::handlers::subscriptions::get_subscriptions,
        crate::handlers::subscriptions::get_followers,
    ),
    components(
        schemas(
            ApiResponse<UserResponse>,
            ApiResponse<Vec<UserResponse>>,
            ApiResponse<String>,
            ErrorResponse,
            HealthResponse,
            CreateUserRequest,
            UpdateUserRequest,
            AvatarUploadRequest,
            UserResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User account endpoints"),
        (name = "subscriptions", description = "Follow relations between users"),
    ),
    info(
        title = "Userbase API",
        description = "Email-identified user accounts with profiles and followers",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
