use axum::extract::{FromRequestParts, Request, State};
use axum::http::{header, request::Parts, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use diesel::prelude::*;

use crate::error::ApiError;
use crate::models::{Role, Session, User};
use crate::schema::{sessions, users};
use crate::AppState;

use super::session::SessionStore;

/// Per-request authentication result, stashed in request extensions by
/// [`authenticate`] and read back by the extractors below.
#[derive(Clone)]
struct AuthContext(Option<User>);

/// Router-wide middleware that resolves the session cookie once per request.
///
/// Expired sessions are deleted on sight (lazy expiry, no sweeper) and the
/// cookie is cleared. Sessions past the refresh interval are transparently
/// replaced; the new cookie rides out on this response. Two concurrent
/// requests can both pass the refresh check and each delete+recreate; the
/// loser's cookie then references a superseded session id. That race is
/// accepted, not fixed.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let (user, set_cookie) = match resolve(&state, &jar) {
        Ok(outcome) => outcome,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(AuthContext(user));

    let mut response = next.run(request).await;

    if let Some(cookie) = set_cookie {
        append_session_cookie(
            response.headers_mut(),
            state.sessions.cookie_name(),
            &cookie,
        );
    }

    response
}

/// Append the middleware's Set-Cookie unless the handler already issued one
/// for the session cookie. Browsers keep the last Set-Cookie per name, so an
/// unconditional append would override the cookie that login, logout, or
/// register just set and leave the client holding a superseded session id.
fn append_session_cookie(headers: &mut HeaderMap, cookie_name: &str, cookie: &Cookie<'static>) {
    let prefix = format!("{}=", cookie_name);
    let handler_set_one = headers.get_all(header::SET_COOKIE).iter().any(|value| {
        value
            .to_str()
            .map(|v| v.trim_start().starts_with(&prefix))
            .unwrap_or(false)
    });
    if handler_set_one {
        return;
    }

    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        headers.append(header::SET_COOKIE, value);
    }
}

type Resolution = (Option<User>, Option<Cookie<'static>>);

fn resolve(state: &AppState, jar: &CookieJar) -> Result<Resolution, ApiError> {
    let Some(raw) = jar.get(state.sessions.cookie_name()) else {
        return Ok((None, None));
    };
    let Some((user_id, session_id)) = SessionStore::parse_cookie_value(raw.value()) else {
        return Ok((None, None));
    };

    let mut conn = state.pool.get()?;

    let row: Option<(Session, User)> = sessions::table
        .inner_join(users::table)
        .filter(sessions::id.eq(session_id))
        .filter(sessions::user_id.eq(user_id))
        .select((Session::as_select(), User::as_select()))
        .first(&mut conn)
        .optional()?;

    let Some((session, user)) = row else {
        return Ok((None, None));
    };

    if session.expiration_at <= Utc::now() {
        let cookie = state.sessions.delete(&mut conn, user.id)?;
        tracing::debug!(user_id = %user.id, "session expired, deleted");
        return Ok((None, Some(cookie)));
    }

    if state.sessions.needs_refresh(&session) {
        let cookie = state.sessions.refresh(&mut conn, user.id)?;
        tracing::debug!(user_id = %user.id, "session refreshed");
        return Ok((Some(user), Some(cookie)));
    }

    Ok((Some(user), None))
}

fn context_user(parts: &Parts) -> Option<User> {
    parts
        .extensions
        .get::<AuthContext>()
        .and_then(|ctx| ctx.0.clone())
}

/// Extractor for handlers that require a signed-in user.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        context_user(parts)
            .map(CurrentUser)
            .ok_or(ApiError::Unauthenticated)
    }
}

/// Extractor for admin-only handlers: 401 for guests, 403 for non-admins.
pub struct CurrentAdmin(pub User);

impl<S> FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = context_user(parts).ok_or(ApiError::Unauthenticated)?;
        if user.role != Role::Admin {
            return Err(ApiError::Forbidden);
        }
        Ok(CurrentAdmin(user))
    }
}

/// Extractor for pages that render differently for guests: never fails.
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(context_user(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn session_cookie() -> Cookie<'static> {
        Cookie::new("session", format!("{}.{}", Uuid::new_v4(), Uuid::new_v4()))
    }

    #[test]
    fn handler_cookie_wins_over_middleware_refresh() {
        // Login just minted a fresh session and set its cookie; the
        // middleware still holds a refresh cookie for the session login
        // deleted. The handler's cookie must be the only one sent.
        let login_cookie = session_cookie();
        let mut headers = HeaderMap::new();
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_str(&login_cookie.to_string()).unwrap(),
        );

        let stale_refresh = session_cookie();
        append_session_cookie(&mut headers, "session", &stale_refresh);

        let values: Vec<_> = headers.get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].to_str().unwrap(), login_cookie.to_string());
    }

    #[test]
    fn refresh_cookie_applies_when_handler_set_none() {
        let mut headers = HeaderMap::new();
        let refresh = session_cookie();
        append_session_cookie(&mut headers, "session", &refresh);

        let values: Vec<_> = headers.get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(values.len(), 1);
        assert!(values[0].to_str().unwrap().starts_with("session="));
    }

    #[test]
    fn unrelated_cookies_do_not_suppress_the_refresh() {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, HeaderValue::from_static("theme=dark"));

        append_session_cookie(&mut headers, "session", &session_cookie());

        assert_eq!(headers.get_all(header::SET_COOKIE).iter().count(), 2);
    }
}
