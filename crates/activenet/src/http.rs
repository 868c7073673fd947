//! Raw HTTPS transport with a per-visitor cookie jar.
//!
//! [`UpstreamHttp`] is a thin wrapper over [`reqwest::Client`] that owns
//! the visitor's cookie jar and a bounded request timeout. Redirects are
//! followed transparently, with every `Set-Cookie` along the chain
//! accumulated into the jar -- the bootstrap protocol depends on that.
//! No business logic lives here.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;

use crate::error::UpstreamError;

/// One visitor's HTTP transport: pooled client + cookie jar.
///
/// Cheap to clone; clones share the same underlying connection pool and
/// jar, so a clone is a handle, not a copy.
#[derive(Clone)]
pub struct UpstreamHttp {
    client: reqwest::Client,
    jar: Arc<Jar>,
}

impl UpstreamHttp {
    /// Build a transport with an empty cookie jar and the given
    /// per-request timeout. Every request through this transport fails
    /// with a timeout error rather than hanging.
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, jar })
    }

    /// Build a *fresh* transport (new jar, new client) seeded with the
    /// cookies this transport currently holds for `url`.
    ///
    /// Used by login: the sign-in POST runs on the seeded copy so a
    /// failed attempt cannot dirty the live jar, and a successful one is
    /// swapped in whole.
    pub fn seeded_clone(&self, url: &Url, timeout: Duration) -> Result<Self, UpstreamError> {
        let fresh = Self::new(timeout)?;
        if let Some(header) = self.cookie_header(url) {
            for pair in header.split("; ") {
                if !pair.is_empty() {
                    fresh.jar.add_cookie_str(pair, url);
                }
            }
        }
        Ok(fresh)
    }

    /// Start a GET request.
    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url)
    }

    /// Start a POST request.
    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.post(url)
    }

    /// The `Cookie` header value the jar would send to `url`, if any.
    /// Diagnostic/inspection surface; requests attach cookies themselves.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.jar
            .cookies(url)
            .and_then(|v| v.to_str().map(str::to_string).ok())
    }
}

impl std::fmt::Debug for UpstreamHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Cookie values are session secrets; never print them.
        f.debug_struct("UpstreamHttp").finish_non_exhaustive()
    }
}
