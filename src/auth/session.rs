use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::models::{NewSession, Session};
use crate::schema::sessions;

/// Creates, refreshes, and deletes session rows and issues the matching
/// cookie. One active session per user: saving always follows a delete during
/// refresh, and the `sessions.user_id` unique constraint backs that up.
#[derive(Clone, Debug)]
pub struct SessionStore {
    cookie_name: String,
    ttl: Duration,
    refresh_interval: Duration,
}

impl SessionStore {
    pub fn new(cookie_name: String, ttl_secs: i64, refresh_secs: i64) -> Self {
        SessionStore {
            cookie_name,
            ttl: Duration::seconds(ttl_secs),
            refresh_interval: Duration::seconds(refresh_secs),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Stamp a new session: `expiration_at` is always `created_at + ttl`.
    pub fn create(&self, user_id: Uuid) -> NewSession {
        let now = Utc::now();
        NewSession {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            expiration_at: now + self.ttl,
        }
    }

    /// Persist a new session row and return the cookie carrying
    /// `"{user_id}.{session_id}"`.
    pub fn save(&self, conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Cookie<'static>> {
        let session = self.create(user_id);

        diesel::insert_into(sessions::table)
            .values(&session)
            .execute(conn)?;

        Ok(self.cookie(user_id, session.id))
    }

    /// Remove every session row for the user and return a removal cookie.
    /// Deleting a user with no sessions is a no-op, not an error.
    pub fn delete(&self, conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Cookie<'static>> {
        diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id))).execute(conn)?;
        Ok(self.removal_cookie())
    }

    /// Delete-then-save: mints a new session id and a new cookie. Used both
    /// for login and for the passive rolling refresh.
    pub fn refresh(&self, conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Cookie<'static>> {
        self.delete(conn, user_id)?;
        self.save(conn, user_id)
    }

    /// Sliding-window check: true once the session is older than the refresh
    /// interval, well before its hard expiry.
    pub fn needs_refresh(&self, session: &Session) -> bool {
        session.created_at + self.refresh_interval <= Utc::now()
    }

    /// Parse a cookie value of the form `"{user_id}.{session_id}"`. UUIDs
    /// cannot contain dots, so a plain split is unambiguous.
    pub fn parse_cookie_value(value: &str) -> Option<(Uuid, Uuid)> {
        let (user_id, session_id) = value.split_once('.')?;
        Some((user_id.parse().ok()?, session_id.parse().ok()?))
    }

    fn cookie(&self, user_id: Uuid, session_id: Uuid) -> Cookie<'static> {
        let mut cookie = Cookie::new(
            self.cookie_name.clone(),
            format!("{}.{}", user_id, session_id),
        );
        cookie.set_http_only(true);
        cookie.set_secure(true);
        cookie.set_same_site(SameSite::Strict);
        cookie.set_path("/");
        cookie.set_max_age(time::Duration::seconds(self.ttl.num_seconds()));
        cookie
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.cookie_name.clone(), "");
        cookie.set_path("/");
        cookie.make_removal();
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new("session".to_string(), 3600, 900)
    }

    #[test]
    fn expiration_is_created_at_plus_ttl() {
        let session = store().create(Uuid::new_v4());
        assert_eq!(session.expiration_at - session.created_at, Duration::seconds(3600));
    }

    #[test]
    fn fresh_session_does_not_need_refresh() {
        let store = store();
        let new = store.create(Uuid::new_v4());
        let session = Session {
            id: new.id,
            user_id: new.user_id,
            created_at: new.created_at,
            expiration_at: new.expiration_at,
        };
        assert!(!store.needs_refresh(&session));
    }

    #[test]
    fn stale_session_needs_refresh() {
        let store = store();
        let created_at = Utc::now() - Duration::seconds(901);
        let session = Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at,
            expiration_at: created_at + Duration::seconds(3600),
        };
        assert!(store.needs_refresh(&session));
    }

    #[test]
    fn cookie_value_round_trips() {
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let value = format!("{}.{}", user_id, session_id);
        assert_eq!(
            SessionStore::parse_cookie_value(&value),
            Some((user_id, session_id))
        );
    }

    #[test]
    fn malformed_cookie_values_are_rejected() {
        assert_eq!(SessionStore::parse_cookie_value(""), None);
        assert_eq!(SessionStore::parse_cookie_value("no-dot"), None);
        assert_eq!(SessionStore::parse_cookie_value("a.b"), None);
        assert_eq!(
            SessionStore::parse_cookie_value(&format!("{}.", Uuid::new_v4())),
            None
        );
    }

    #[test]
    fn issued_cookie_carries_session_attributes() {
        let store = store();
        let cookie = store.cookie(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
    }
}
