use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use accounts::{ExtraFields, UserChanges};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::user::{self, Gender};
use sea_orm::{EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a new user
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Email address (login identifier, must be unique)
    #[validate(email)]
    pub email: String,
    /// Optional password; without one the account cannot log in
    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    /// One of: unknown, male, female, genderless
    pub gender: Option<String>,
}

/// Request body for updating a user
#[derive(Deserialize, Serialize, ToSchema, Validate, Default)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    /// One of: unknown, male, female, genderless
    pub gender: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

/// Request body for assigning an avatar to a user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct AvatarUploadRequest {
    /// Original file name of the uploaded image
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
}

/// User response model. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub avatar: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub has_usable_password: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            has_usable_password: accounts::has_usable_password(&model),
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            gender: model.gender.to_string(),
            avatar: model.avatar,
            is_staff: model.is_staff,
            is_superuser: model.is_superuser,
            is_active: model.is_active,
            date_joined: model.date_joined,
            last_login: model.last_login,
        }
    }
}

// Helper function to parse an optional gender string
fn parse_gender(gender: Option<&str>) -> Result<Option<Gender>, ApiError> {
    gender
        .map(str::parse::<Gender>)
        .transpose()
        .map_err(|message| {
            warn!("{}", message);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(message, "INVALID_GENDER")),
            )
        })
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    trace!("Entering create_user function");
    debug!("Creating user with email: {}", request.email);

    let extra = ExtraFields {
        first_name: request.first_name,
        last_name: request.last_name,
        gender: parse_gender(request.gender.as_deref())?,
        ..Default::default()
    };

    let user_model = state
        .users
        .create_user(&state.db, &request.email, request.password.as_deref(), extra)
        .await
        .map_err(|err| {
            error!("Failed to create user '{}': {}", request.email, err);
            ErrorResponse::from_account_error(err)
        })?;

    info!("User created successfully with ID: {}", user_model.id);
    let response = ApiResponse {
        data: UserResponse::from(user_model),
        message: "User created successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, StatusCode> {
    trace!("Entering get_users function");

    match user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(users) => {
            debug!("Retrieved {} users from database", users.len());
            let response = ApiResponse {
                data: users.into_iter().map(UserResponse::from).collect(),
                message: "Users retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve users from database: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering get_user function for user_id: {}", user_id);

    let user_model = state
        .users
        .get_user(&state.db, user_id)
        .await
        .map_err(ErrorResponse::from_account_error)?;

    let response = ApiResponse {
        data: UserResponse::from(user_model),
        message: "User retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateUserRequest>>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering update_user function for user_id: {}", user_id);

    let changes = UserChanges {
        gender: parse_gender(request.gender.as_deref())?,
        email: request.email,
        password: request.password,
        first_name: request.first_name,
        last_name: request.last_name,
        is_staff: request.is_staff,
        is_superuser: request.is_superuser,
        is_active: request.is_active,
    };

    let updated_user = state
        .users
        .update_user(&state.db, user_id, changes)
        .await
        .map_err(|err| {
            warn!("Failed to update user with ID {}: {}", user_id, err);
            ErrorResponse::from_account_error(err)
        })?;

    let response = ApiResponse {
        data: UserResponse::from(updated_user),
        message: "User updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_user function for user_id: {}", user_id);

    state
        .users
        .delete_user(&state.db, user_id)
        .await
        .map_err(ErrorResponse::from_account_error)?;

    let response = ApiResponse {
        data: format!("User {} deleted", user_id),
        message: "User deleted successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Assign a storage path for a user's uploaded avatar
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/avatar",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = AvatarUploadRequest,
    responses(
        (status = 200, description = "Avatar assigned", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn upload_avatar(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<AvatarUploadRequest>>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let updated_user = state
        .users
        .assign_avatar(&state.db, user_id, &request.filename)
        .await
        .map_err(ErrorResponse::from_account_error)?;

    let response = ApiResponse {
        data: UserResponse::from(updated_user),
        message: "Avatar assigned successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
