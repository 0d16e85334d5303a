pub mod info;
pub mod login;
pub mod logout;
pub mod register;

use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::models::{Role, User};
use crate::AppState;

/// Returns the router for auth endpoints (mounted at /api/v1/auth)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register::register))
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
        .route("/info", get(info::user_info))
}

/// Public view of a user; the password hash never leaves the server.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub email: String,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            user_id: user.id,
            email: user.email,
            nickname: user.nickname,
            created_at: user.created_at,
            role: user.role,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(register::register, login::login, logout::logout, info::user_info),
    components(schemas(
        UserResponse,
        register::RegisterRequest,
        login::LoginRequest,
    ))
)]
pub struct ApiDoc;
