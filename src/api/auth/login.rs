use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::CookieJar;
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::ErrorResponse;
use crate::error::ApiError;
use crate::models::User;
use crate::schema::users;
use crate::AppState;

use super::UserResponse;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = UserResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.pool.get()?;

    let user: Option<User> = users::table
        .filter(users::email.eq(&req.email))
        .select(User::as_select())
        .first(&mut conn)
        .optional()?;

    // Same failure for unknown email and wrong password
    let user = match user {
        Some(user) if state.passwords.verify(&req.password, &user.password_hash) => user,
        _ => {
            tracing::warn!(email = %req.email, "failed login attempt");
            return Err(ApiError::Unauthenticated);
        }
    };

    // Logging in clobbers any prior session for this user
    let cookie = state.sessions.refresh(&mut conn, user.id)?;

    tracing::info!(email = %user.email, "user logged in");

    Ok((jar.add(cookie), Json(UserResponse::from(user))))
}
