//! Anonymous-session bootstrap.
//!
//! ActiveNet grants read-only access to anonymous browsers that have
//! walked the sign-in page's redirect chain: the chain deposits the
//! session cookies, and the final HTML embeds the CSRF token as a
//! script-level assignment `window.__csrfToken = "<token>"`.
//!
//! The transport follows the redirects and accumulates the cookies in
//! its jar; this module only fetches the page and pulls out the token.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::UpstreamError;
use crate::http::UpstreamHttp;

/// Fetch the sign-in page through `http` (cookies land in its jar) and
/// return the embedded CSRF token.
///
/// Any transport failure, a non-2xx final response, or a page without
/// the token assignment is an error -- the visitor cannot act without a
/// bootstrapped session, so the caller surfaces a generic failure.
pub async fn bootstrap(http: &UpstreamHttp, signin_page_url: &str) -> Result<String, UpstreamError> {
    let response = http.get(signin_page_url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Protocol(format!(
            "sign-in page returned HTTP {status}"
        )));
    }

    let html = response.text().await?;
    let token = extract_csrf_token(&html).ok_or_else(|| {
        UpstreamError::Protocol("sign-in page did not embed a CSRF token".to_string())
    })?;

    tracing::debug!("bootstrapped anonymous upstream session");
    Ok(token)
}

/// Locate the one inline `window.__csrfToken = "<token>"` assignment.
///
/// Kept as a single narrow function so a future move to a structured
/// HTML parse does not change the bootstrap contract.
pub fn extract_csrf_token(html: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"window\.__csrfToken\s*=\s*"([^"]+)""#).expect("static regex must compile")
    });
    re.captures(html).map(|caps| caps[1].to_string())
}
