use axum::{response::IntoResponse, Json};

use crate::api::ErrorResponse;
use crate::auth::CurrentUser;

use super::UserResponse;

#[utoipa::path(
    get,
    path = "/api/v1/auth/info",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn user_info(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(UserResponse::from(user))
}
