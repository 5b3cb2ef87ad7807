use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use super::extract::{expired_session_cookie, session_cookie, session_token, JsonBody};
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// `POST /api/auth/seed-admin`
pub async fn seed_admin(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Credentials>,
) -> Result<Json<Value>, ApiError> {
    state
        .auth
        .bootstrap_admin(&body.username, &body.password)
        .await?;
    Ok(Json(json!({ "message": "Admin created" })))
}

/// `POST /api/auth/login` — sets the session cookie and also returns the token.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth.login(&body.username, &body.password).await?;
    Ok((
        [(SET_COOKIE, session_cookie(&session.token))],
        Json(json!({
            "message": "Login successful",
            "username": session.username,
            "token": session.token,
        })),
    ))
}

/// `GET /api/auth/me` — never fails; an absent or bad token reads as logged out.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    match session_token(&headers).and_then(|token| state.auth.verify(&token).ok()) {
        Some(claims) => Json(json!({ "loggedIn": true, "username": claims.username })),
        None => Json(json!({ "loggedIn": false })),
    }
}

/// `POST /api/auth/logout`
pub async fn logout() -> impl IntoResponse {
    (
        [(SET_COOKIE, expired_session_cookie())],
        Json(json!({ "message": "Logged out" })),
    )
}
