//! Handlers for the `/auth` resource (login, logout, session status).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use samo_activenet::models::CustomerProfile;

use crate::error::AppResult;
use crate::middleware::session::{clear_session_cookie, SessionClient};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Session status returned by `GET /auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub authenticated: bool,
    pub profile: Option<CustomerProfile>,
}

/// POST /api/v1/auth/login
///
/// Sign the visitor's upstream client in. The password lives only in
/// this request's body: it is handed to the client (which sends it
/// upstream in a single TLS POST) and dropped when this handler
/// returns -- never stored, logged, or echoed back.
pub async fn login(
    session: SessionClient,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<CustomerProfile>>> {
    let profile = session.client.login(&input.username, &input.password).await?;
    Ok(Json(DataResponse { data: profile }))
}

/// POST /api/v1/auth/logout
///
/// Clear the client's upstream state, drop the visitor session, and
/// expire the browser cookie. Returns 204 No Content.
pub async fn logout(
    State(state): State<AppState>,
    session: SessionClient,
) -> AppResult<impl IntoResponse> {
    // remove() clears the client's cookie jar and tokens before dropping it.
    state.sessions.remove(&session.session_id).await;
    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_session_cookie())],
    ))
}

/// GET /api/v1/auth/session
///
/// The current visitor's authentication status and profile.
pub async fn session_info(session: SessionClient) -> AppResult<Json<DataResponse<SessionInfo>>> {
    let authenticated = session.client.is_authenticated().await;
    let profile = session.client.profile().await;
    Ok(Json(DataResponse {
        data: SessionInfo {
            authenticated,
            profile,
        },
    }))
}
