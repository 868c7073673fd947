//! Session-cookie middleware and the per-request client extractor.
//!
//! Every request under `/api/v1` resolves (or lazily creates) a visitor
//! session: the `samo_session` cookie value is looked up in the store,
//! an unknown or absent cookie triggers a fresh bootstrap, and the
//! resolved client rides the request extensions. New sessions get their
//! cookie set on the outgoing response (http-only, secure, strict
//! same-site), so the browser round-trips the opaque id and nothing else.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use samo_activenet::client::ActiveNetClient;

use crate::error::AppError;
use crate::state::AppState;

/// Name of the browser-side session cookie.
pub const SESSION_COOKIE: &str = "samo_session";

/// The visitor session resolved for this request.
#[derive(Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub client: Arc<ActiveNetClient>,
    /// True when this request created the session (cookie must be set).
    pub created: bool,
}

/// Resolve-or-create middleware. Applied to every route that talks to
/// the upstream.
///
/// A bootstrap failure is fatal to this request only: the visitor gets a
/// generic failure response and the process keeps serving others.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut existing = None;
    if let Some(id) = cookie_value(request.headers(), SESSION_COOKIE) {
        if let Some(client) = state.sessions.get(&id).await {
            existing = Some(SessionContext {
                session_id: id,
                client,
                created: false,
            });
        }
    }

    let context = match existing {
        Some(context) => context,
        None => match state.sessions.create().await {
            Ok((session_id, client)) => SessionContext {
                session_id,
                client,
                created: true,
            },
            Err(err) => return AppError::from(err).into_response(),
        },
    };

    let created = context.created;
    let session_id = context.session_id.clone();
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    if created {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(&session_id)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Extractor for handlers that need the visitor's upstream client.
///
/// ```ignore
/// async fn my_handler(session: SessionClient) -> AppResult<Json<()>> {
///     let authenticated = session.client.is_authenticated().await;
///     ...
/// }
/// ```
#[derive(Clone)]
pub struct SessionClient {
    pub session_id: String,
    pub client: Arc<ActiveNetClient>,
}

impl FromRequestParts<AppState> for SessionClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<SessionContext>()
            .ok_or(AppError::SessionNotFound)?;
        Ok(SessionClient {
            session_id: context.session_id.clone(),
            client: Arc::clone(&context.client),
        })
    }
}

/// `Set-Cookie` value for a newly created session.
fn session_cookie(session_id: &str) -> String {
    format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; Secure; SameSite=Strict")
}

/// `Set-Cookie` value that expires the session cookie (logout).
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0")
}

/// Pull one cookie's value out of the `Cookie` header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    let prefix = format!("{name}=");
    raw.split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(prefix.as_str()).map(str::to_string))
}
