use crate::handlers::users::UserResponse;
use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use accounts::subscriptions;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{debug, info, instrument, warn};

/// Follow another user
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/subscriptions/{target_id}",
    tag = "subscriptions",
    params(
        ("user_id" = i32, Path, description = "Subscribing user ID"),
        ("target_id" = i32, Path, description = "User ID to follow"),
    ),
    responses(
        (status = 201, description = "Subscription created", body = ApiResponse<String>),
        (status = 200, description = "Already subscribed", body = ApiResponse<String>),
        (status = 400, description = "Cannot subscribe to self", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn subscribe(
    Path((user_id, target_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), ApiError> {
    let created = subscriptions::subscribe(&state.db, user_id, target_id)
        .await
        .map_err(ErrorResponse::from_account_error)?;

    let (status, message) = if created {
        info!("User {} subscribed to {}", user_id, target_id);
        (StatusCode::CREATED, "Subscription created successfully")
    } else {
        (StatusCode::OK, "Already subscribed")
    };

    let response = ApiResponse {
        data: format!("User {} follows {}", user_id, target_id),
        message: message.to_string(),
        success: true,
    };
    Ok((status, Json(response)))
}

/// Stop following a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/subscriptions/{target_id}",
    tag = "subscriptions",
    params(
        ("user_id" = i32, Path, description = "Subscribing user ID"),
        ("target_id" = i32, Path, description = "Followed user ID"),
    ),
    responses(
        (status = 200, description = "Subscription removed", body = ApiResponse<String>),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn unsubscribe(
    Path((user_id, target_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let removed = subscriptions::unsubscribe(&state.db, user_id, target_id)
        .await
        .map_err(ErrorResponse::from_account_error)?;

    if !removed {
        warn!("User {} does not follow {}", user_id, target_id);
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("User {} does not follow {}", user_id, target_id),
                "SUBSCRIPTION_NOT_FOUND",
            )),
        ));
    }

    let response = ApiResponse {
        data: format!("User {} unfollowed {}", user_id, target_id),
        message: "Subscription removed successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// List the users a user follows
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/subscriptions",
    tag = "subscriptions",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Subscriptions retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_subscriptions(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = subscriptions::subscriptions_of(&state.db, user_id)
        .await
        .map_err(ErrorResponse::from_account_error)?;
    debug!("User {} follows {} users", user_id, users.len());

    let response = ApiResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
        message: "Subscriptions retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// List the followers of a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/followers",
    tag = "subscriptions",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Followers retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_followers(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = subscriptions::followers_of(&state.db, user_id)
        .await
        .map_err(ErrorResponse::from_account_error)?;
    debug!("User {} has {} followers", user_id, users.len());

    let response = ApiResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
        message: "Followers retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
