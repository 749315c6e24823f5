use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::AppState;
use crate::auth;
use crate::error::ApiError;
use crate::models::{NewSession, NewUser, Session, User};
use crate::schema::{sessions, users};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(email), Some(password)) = (
        body.email.filter(|e| !e.is_empty()),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Missing fields"));
    };

    let user = NewUser {
        id: Uuid::new_v4().to_string(),
        email,
        password: auth::hash_password(&password)?,
        role: body.role.unwrap_or_else(|| "user".to_string()),
    };

    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    diesel::insert_into(users::table)
        .values(&user)
        .execute(&mut conn)
        .await
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => ApiError::conflict("Email already registered"),
            other => other.into(),
        })?;

    tracing::info!("registered user {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "userId": user.id })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    let user = users::table
        .filter(users::email.eq(&body.email))
        .first::<User>(&mut conn)
        .await
        .optional()?;

    // same response for unknown email and wrong password
    let Some(user) = user.filter(|u| auth::verify_password(&body.password, &u.password)) else {
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let session_id = Uuid::new_v4().to_string();
    diesel::insert_into(sessions::table)
        .values(&NewSession {
            id: session_id.clone(),
            user_id: user.id.clone(),
        })
        .execute(&mut conn)
        .await?;

    let expires_at = Utc::now() + Duration::days(auth::SESSION_TTL_DAYS);
    let session = json!({
        "id": session_id.clone(),
        "user": { "id": user.id, "email": user.email, "role": user.role },
        "expiresAt": expires_at.to_rfc3339(),
    });

    let jar = jar.add(auth::session_cookie(session_id, state.secure_cookies));
    Ok((jar, Json(json!({ "success": true, "session": session }))))
}

pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    let Some(cookie) = jar.get(auth::SESSION_COOKIE) else {
        return Err(ApiError::unauthorized("Not authenticated"));
    };

    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    let session = sessions::table
        .find(cookie.value())
        .first::<Session>(&mut conn)
        .await
        .optional()?;

    let Some(session) = session else {
        return Err(ApiError::unauthorized("Invalid session"));
    };

    let user = users::table
        .find(session.user_id.as_str())
        .first::<User>(&mut conn)
        .await
        .optional()?;

    let Some(user) = user else {
        return Err(ApiError::not_found("User not found"));
    };

    Ok(Json(json!({
        "id": user.id,
        "email": user.email,
        "role": user.role,
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let session_id = jar
        .get(auth::SESSION_COOKIE)
        .map(|c| c.value().to_string());

    if let Some(session_id) = session_id {
        let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
        diesel::delete(sessions::table.find(session_id.as_str()))
            .execute(&mut conn)
            .await?;
    }

    let jar = jar.remove(auth::removal_cookie());
    Ok((jar, Json(json!({ "success": true }))))
}
