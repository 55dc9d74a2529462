use crate::handlers::{
    health::health_check,
    subscriptions::{get_followers, get_subscriptions, subscribe, unsubscribe},
    users::{create_user, delete_user, get_user, get_users, update_user, upload_avatar},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User CRUD routes
        .route("/api/v1/users", post(create_user).get(get_users))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/v1/users/:user_id/avatar", put(upload_avatar))
        // Follow relations
        .route("/api/v1/users/:user_id/subscriptions", get(get_subscriptions))
        .route(
            "/api/v1/users/:user_id/subscriptions/:target_id",
            post(subscribe).delete(unsubscribe),
        )
        .route("/api/v1/users/:user_id/followers", get(get_followers))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
