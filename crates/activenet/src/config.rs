//! Upstream endpoint configuration.

use std::time::Duration;

/// Where the ActiveNet deployment lives and how to talk to it.
///
/// All fields have defaults pointing at the Santa Monica deployment;
/// override via environment variables for another site.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the REST API, no trailing slash
    /// (default: the Santa Monica `/rest` root).
    pub base_url: String,
    /// Browser-facing sign-in page URL; the bootstrap protocol follows
    /// its redirect chain to collect cookies and the CSRF token.
    pub signin_page_url: String,
    /// `locale` query parameter attached to every call (default: `en-US`).
    pub locale: String,
    /// Per-request timeout in seconds (default: `15`).
    pub timeout_secs: u64,
}

const DEFAULT_BASE_URL: &str =
    "https://anc.apm.activecommunities.com/santamonicarecreation/rest";
const DEFAULT_SIGNIN_PAGE_URL: &str =
    "https://anc.apm.activecommunities.com/santamonicarecreation/signin";

impl UpstreamConfig {
    /// Load upstream configuration from environment variables.
    ///
    /// | Env Var                 | Default                      |
    /// |-------------------------|------------------------------|
    /// | `UPSTREAM_BASE_URL`     | Santa Monica `/rest` root    |
    /// | `UPSTREAM_SIGNIN_URL`   | Santa Monica sign-in page    |
    /// | `UPSTREAM_LOCALE`       | `en-US`                      |
    /// | `UPSTREAM_TIMEOUT_SECS` | `15`                         |
    pub fn from_env() -> Self {
        let base_url = std::env::var("UPSTREAM_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let signin_page_url =
            std::env::var("UPSTREAM_SIGNIN_URL").unwrap_or_else(|_| DEFAULT_SIGNIN_PAGE_URL.into());

        let locale = std::env::var("UPSTREAM_LOCALE").unwrap_or_else(|_| "en-US".into());

        let timeout_secs: u64 = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .expect("UPSTREAM_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            signin_page_url,
            locale,
            timeout_secs,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            signin_page_url: DEFAULT_SIGNIN_PAGE_URL.to_string(),
            locale: "en-US".to_string(),
            timeout_secs: 15,
        }
    }
}
