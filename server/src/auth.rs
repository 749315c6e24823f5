use anyhow::anyhow;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::api::AppState;
use crate::error::ApiError;
use crate::models::Session;
use crate::schema::sessions;

pub const SESSION_COOKIE: &str = "session_id";

/// Sessions are issued with a 7 day cookie. There is no server-side
/// expiry sweep; a session row lives until logout deletes it.
pub const SESSION_TTL_DAYS: i64 = 7;

pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(anyhow!("password hashing failed: {}", e)))
}

pub fn verify_password(plain: &str, hashed: &str) -> bool {
    bcrypt::verify(plain, hashed).unwrap_or(false)
}

/// Builds the `session_id` cookie set on login.
pub fn session_cookie(session_id: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_secure(secure);
    cookie.set_max_age(time::Duration::days(SESSION_TTL_DAYS));
    cookie
}

/// Cookie used to clear the session on logout. The path must match the
/// login cookie or browsers keep the stale one around.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}

/// Guard applied to the resource routes: the request must carry a
/// `session_id` cookie that matches a stored session. Auth routes and
/// the health probe are mounted outside this layer.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Err(ApiError::unauthorized("Not authenticated"));
    };

    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    let session = sessions::table
        .filter(sessions::id.eq(cookie.value()))
        .first::<Session>(&mut conn)
        .await
        .optional()?;

    if session.is_none() {
        return Err(ApiError::unauthorized("Invalid session"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        // low cost to keep the test fast
        let hashed = bcrypt::hash("s3cret", 4).unwrap();
        assert!(verify_password("s3cret", &hashed));
        assert!(!verify_password("wrong", &hashed));
    }

    #[test]
    fn verify_tolerates_garbage_hashes() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("abc123".to_string(), false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
        assert_eq!(cookie.secure(), Some(false));

        let secure = session_cookie("abc123".to_string(), true);
        assert_eq!(secure.secure(), Some(true));
    }

    #[test]
    fn removal_cookie_matches_login_path() {
        let cookie = removal_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
    }
}
