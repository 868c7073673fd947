//! Stateful per-visitor ActiveNet client.
//!
//! One [`ActiveNetClient`] belongs to exactly one visitor session. It
//! owns the visitor's transport (cookie jar), CSRF token, access/refresh
//! tokens, authenticated flag, and customer profile. Mutating operations
//! (login, logout, CSRF refresh) serialize on an internal write lock;
//! read-only calls proceed concurrently on a snapshot of the transport
//! and token state captured at call start.

use std::sync::Arc;

use reqwest::{StatusCode, Url};
use serde::Serialize;
use tokio::sync::RwLock;

use samo_core::envelope::ResponseEnvelope;

use crate::bootstrap::bootstrap;
use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::http::UpstreamHttp;
use crate::models::{CustomerProfile, SigninBody, SigninRequest};

/// Pagination for endpoints that page via the `page_info` request header
/// (the upstream reads the header, not a query parameter).
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page_number: i64,
    pub records_per_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            records_per_page: 20,
        }
    }
}

impl PageRequest {
    /// Compact-JSON header value, matching what the upstream UI sends.
    fn header_value(&self) -> String {
        format!(
            r#"{{"order_by":"","page_number":{},"total_records_per_page":{}}}"#,
            self.page_number, self.records_per_page
        )
    }
}

/// Mutable per-visitor state, guarded by the client's lock.
struct ClientState {
    http: UpstreamHttp,
    csrf_token: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    authenticated: bool,
    profile: Option<CustomerProfile>,
}

impl std::fmt::Debug for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Tokens are session secrets: show presence, never values.
        f.debug_struct("ClientState")
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("authenticated", &self.authenticated)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

/// HTTP client wrapper for one visitor's ActiveNet session.
#[derive(Debug)]
pub struct ActiveNetClient {
    config: Arc<UpstreamConfig>,
    state: RwLock<ClientState>,
}

impl ActiveNetClient {
    /// Bootstrap a fresh anonymous client: build a transport with an
    /// empty jar, walk the sign-in redirect chain (cookies accumulate),
    /// and extract the CSRF token.
    pub async fn new(config: Arc<UpstreamConfig>) -> Result<Self, UpstreamError> {
        let http = UpstreamHttp::new(config.timeout())?;
        let csrf_token = bootstrap(&http, &config.signin_page_url).await?;

        Ok(Self {
            config,
            state: RwLock::new(ClientState {
                http,
                csrf_token: Some(csrf_token),
                access_token: None,
                refresh_token: None,
                authenticated: false,
                profile: None,
            }),
        })
    }

    /// Issue a GET to `{base_url}{path}`.
    ///
    /// Attaches the XHR marker header, the jar's cookies, the `locale`
    /// parameter, and a millisecond cache-buster. Returns the decoded
    /// envelope; `"0001"` (empty result) counts as success.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ResponseEnvelope, UpstreamError> {
        let http = self.state.read().await.http.clone();
        let url = format!("{}{}", self.config.base_url, path);

        let mut params: Vec<(&str, String)> = vec![
            ("locale", self.config.locale.clone()),
            ("_", chrono::Utc::now().timestamp_millis().to_string()),
        ];
        params.extend(query.iter().map(|(k, v)| (*k, v.clone())));

        let response = http
            .get(&url)
            .query(&params)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(reqwest::header::ACCEPT, "*/*")
            .send()
            .await?;

        Self::decode_envelope(response).await
    }

    /// Issue a POST to `{base_url}{path}` with a JSON body.
    ///
    /// Mutating calls carry the CSRF header. A 403 rejection is treated
    /// as a stale token: the bootstrap protocol runs once more to refresh
    /// cookies and token, the request is retried once, and a second 403
    /// surfaces as an auth error.
    pub async fn post<B>(
        &self,
        path: &str,
        body: &B,
        page: Option<PageRequest>,
    ) -> Result<ResponseEnvelope, UpstreamError>
    where
        B: Serialize + ?Sized,
    {
        let (http, csrf_token) = {
            let state = self.state.read().await;
            (state.http.clone(), state.csrf_token.clone())
        };

        let response = self
            .send_post(&http, path, body, page, csrf_token.as_deref())
            .await?;
        if response.status() != StatusCode::FORBIDDEN {
            return Self::decode_envelope(response).await;
        }

        tracing::warn!(path, "mutating call rejected with 403; refreshing CSRF token");
        let token = self.refresh_csrf().await?;
        let http = self.state.read().await.http.clone();

        let retry = self.send_post(&http, path, body, page, Some(&token)).await?;
        if retry.status() == StatusCode::FORBIDDEN {
            return Err(UpstreamError::Auth(
                "mutating call still rejected after CSRF refresh".to_string(),
            ));
        }
        Self::decode_envelope(retry).await
    }

    /// Authenticate against `POST /user/signin`.
    ///
    /// Both credentials are call-scoped: the password is serialized into
    /// the one outbound request and never stored, logged, or captured.
    /// The POST runs on a fresh transport seeded with the current
    /// cookies; only on success are the transport (jar replaced by the
    /// response's `Set-Cookie`), tokens, and profile swapped in. On any
    /// failure the client state is left untouched and the visitor stays
    /// anonymous.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CustomerProfile, UpstreamError> {
        // Write lock for the whole exchange: concurrent logins on one
        // session must not interleave their cookie/token writes.
        let mut state = self.state.write().await;

        let base = Url::parse(&self.config.base_url)
            .map_err(|e| UpstreamError::Protocol(format!("invalid upstream base URL: {e}")))?;
        let fresh = state.http.seeded_clone(&base, self.config.timeout())?;

        let url = format!("{}/user/signin", self.config.base_url);
        let mut builder = fresh
            .post(&url)
            .query(&[("locale", self.config.locale.as_str())])
            .header("X-Requested-With", "XMLHttpRequest")
            .header(reqwest::header::ACCEPT, "*/*")
            .json(&SigninRequest {
                login_name: username,
                password,
            });
        if let Some(token) = state.csrf_token.as_deref() {
            builder = builder.header("X-CSRF-Token", token);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(username, error = %err, "login failed: transport error");
                return Err(err.into());
            }
        };

        let envelope = match Self::decode_envelope(response).await {
            Ok(envelope) => envelope,
            Err(UpstreamError::Business { code, message }) => {
                tracing::warn!(username, code, "login rejected by upstream");
                return Err(UpstreamError::Auth(message));
            }
            Err(err) => {
                tracing::warn!(username, error = %err, "login failed");
                return Err(err);
            }
        };

        let body: SigninBody = serde_json::from_value(envelope.body)
            .map_err(|e| UpstreamError::Protocol(format!("sign-in body did not parse: {e}")))?;

        state.http = fresh;
        state.access_token = Some(body.result.access_token);
        state.refresh_token = Some(body.result.refresh_token);
        if body.result.csrf_token.is_some() {
            state.csrf_token = body.result.csrf_token;
        }
        let profile = body.result.customer.unwrap_or_default();
        state.profile = Some(profile.clone());
        state.authenticated = true;

        tracing::info!(username, "login succeeded");
        Ok(profile)
    }

    /// Drop all session state: fresh empty jar, no tokens, no profile.
    /// The caller is responsible for removing the visitor session from
    /// the store and clearing the browser-side cookie.
    pub async fn logout(&self) -> Result<(), UpstreamError> {
        let mut state = self.state.write().await;
        state.http = UpstreamHttp::new(self.config.timeout())?;
        state.csrf_token = None;
        state.access_token = None;
        state.refresh_token = None;
        state.authenticated = false;
        state.profile = None;
        tracing::debug!("client state cleared on logout");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.authenticated
    }

    pub async fn profile(&self) -> Option<CustomerProfile> {
        self.state.read().await.profile.clone()
    }

    /// Current CSRF token, if the client is bootstrapped.
    pub async fn csrf_token(&self) -> Option<String> {
        self.state.read().await.csrf_token.clone()
    }

    /// The `Cookie` header the jar would send to `url`. Diagnostic only.
    pub async fn cookies_for(&self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        self.state.read().await.http.cookie_header(&url)
    }

    // ---- private helpers ----

    /// Re-run the bootstrap protocol on the live transport (new cookies
    /// accumulate in the jar) and store the refreshed token.
    async fn refresh_csrf(&self) -> Result<String, UpstreamError> {
        let mut state = self.state.write().await;
        let token = bootstrap(&state.http, &self.config.signin_page_url).await?;
        state.csrf_token = Some(token.clone());
        Ok(token)
    }

    async fn send_post<B>(
        &self,
        http: &UpstreamHttp,
        path: &str,
        body: &B,
        page: Option<PageRequest>,
        csrf_token: Option<&str>,
    ) -> Result<reqwest::Response, UpstreamError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.config.base_url, path);
        let mut builder = http
            .post(&url)
            .query(&[("locale", self.config.locale.as_str())])
            .header("X-Requested-With", "XMLHttpRequest")
            .header(reqwest::header::ACCEPT, "*/*")
            .header("page_info", page.unwrap_or_default().header_value())
            .json(body);
        if let Some(token) = csrf_token {
            builder = builder.header("X-CSRF-Token", token);
        }
        Ok(builder.send().await?)
    }

    /// Unwrap the `{headers, body}` envelope.
    ///
    /// Non-2xx responses and unparseable bodies are protocol errors;
    /// a parsed envelope with a non-success code is a business error.
    async fn decode_envelope(response: reqwest::Response) -> Result<ResponseEnvelope, UpstreamError> {
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Protocol(format!(
                "unexpected HTTP {status} from upstream"
            )));
        }

        let text = response.text().await?;
        let envelope: ResponseEnvelope = serde_json::from_str(&text).map_err(|e| {
            UpstreamError::Protocol(format!("response envelope did not parse: {e}"))
        })?;

        if envelope.headers.is_success() {
            Ok(envelope)
        } else {
            Err(UpstreamError::Business {
                code: envelope.headers.response_code.clone(),
                message: envelope.headers.response_message.clone(),
            })
        }
    }
}
