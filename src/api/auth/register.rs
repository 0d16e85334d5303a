use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::CookieJar;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::ErrorResponse;
use crate::error::ApiError;
use crate::models::{NewUser, Role, User};
use crate::schema::users;
use crate::AppState;

use super::UserResponse;

const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 50;
// varchar(50) on the users table; reject up front instead of erroring on insert
const FIELD_MAX: usize = 50;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub nickname: String,
    pub password: String,
}

fn validate(req: &RegisterRequest) -> Result<(), ApiError> {
    if !looks_like_email(&req.email) {
        return Err(ApiError::Validation("invalid email address".to_string()));
    }
    if req.email.chars().count() > FIELD_MAX {
        return Err(ApiError::Validation(format!(
            "email must be at most {} characters",
            FIELD_MAX
        )));
    }
    if req.nickname.trim().is_empty() {
        return Err(ApiError::Validation("nickname cannot be empty".to_string()));
    }
    if req.nickname.chars().count() > FIELD_MAX {
        return Err(ApiError::Validation(format!(
            "nickname must be at most {} characters",
            FIELD_MAX
        )));
    }
    let len = req.password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(ApiError::Validation(format!(
            "password must be between {} and {} characters",
            PASSWORD_MIN, PASSWORD_MAX
        )));
    }
    Ok(())
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created, session cookie set", body = UserResponse),
        (status = 400, description = "Invalid input or email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&req)?;

    let password_hash = state.passwords.hash(&req.password);

    let mut conn = state.pool.get()?;

    let new_user = NewUser {
        email: &req.email,
        nickname: &req.nickname,
        password_hash: &password_hash,
        role: Role::User,
    };

    let user: User = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(&mut conn)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                ApiError::Conflict("email already registered")
            }
            other => other.into(),
        })?;

    let cookie = state.sessions.save(&mut conn, user.id)?;

    tracing::info!(email = %user.email, "user registered");

    Ok((
        StatusCode::CREATED,
        jar.add(cookie),
        Json(UserResponse::from(user)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, nickname: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            nickname: nickname.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_reasonable_input() {
        assert!(validate(&request("cook@example.com", "cook", "longenough")).is_ok());
    }

    #[test]
    fn rejects_bad_email() {
        assert!(validate(&request("not-an-email", "cook", "longenough")).is_err());
        assert!(validate(&request("@example.com", "cook", "longenough")).is_err());
        assert!(validate(&request("cook@nodot", "cook", "longenough")).is_err());
    }

    #[test]
    fn rejects_password_outside_bounds() {
        assert!(validate(&request("cook@example.com", "cook", "short")).is_err());
        assert!(validate(&request("cook@example.com", "cook", &"x".repeat(51))).is_err());
        assert!(validate(&request("cook@example.com", "cook", &"x".repeat(50))).is_ok());
        assert!(validate(&request("cook@example.com", "cook", &"x".repeat(8))).is_ok());
    }

    #[test]
    fn rejects_blank_nickname() {
        assert!(validate(&request("cook@example.com", "  ", "longenough")).is_err());
    }

    #[test]
    fn rejects_overlong_email_and_nickname() {
        // 50 characters total, fits the column
        let email_at_limit = format!("{}@example.com", "x".repeat(38));
        assert!(validate(&request(&email_at_limit, "cook", "longenough")).is_ok());

        let email_over_limit = format!("{}@example.com", "x".repeat(39));
        assert!(validate(&request(&email_over_limit, "cook", "longenough")).is_err());

        assert!(validate(&request("cook@example.com", &"n".repeat(50), "longenough")).is_ok());
        assert!(validate(&request("cook@example.com", &"n".repeat(51), "longenough")).is_err());
    }
}
