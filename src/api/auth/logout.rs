use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;

use crate::api::ErrorResponse;
use crate::auth::SessionStore;
use crate::error::ApiError;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session deleted, cookie cleared"),
        (status = 401, description = "No session cookie", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let raw = jar
        .get(state.sessions.cookie_name())
        .ok_or(ApiError::Unauthenticated)?;

    // The user id is taken from the cookie itself; deleting sessions for a
    // user that has none is a no-op, so a stale cookie still logs out cleanly.
    let (user_id, _) = SessionStore::parse_cookie_value(raw.value())
        .ok_or(ApiError::Unauthenticated)?;

    let mut conn = state.pool.get()?;
    let removal = state.sessions.delete(&mut conn, user_id)?;

    tracing::info!(user_id = %user_id, "user logged out");

    Ok(jar.add(removal))
}
