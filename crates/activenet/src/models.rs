//! Sign-in request/response payloads.

use serde::{Deserialize, Serialize};

/// Body of `POST /user/signin`.
///
/// Borrows the credentials so no owned copy of the password outlives the
/// request that carries it.
#[derive(Serialize)]
pub struct SigninRequest<'a> {
    pub login_name: &'a str,
    pub password: &'a str,
}

/// `body` payload of a successful sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct SigninBody {
    pub result: SigninResult,
}

/// Tokens and profile returned by the sign-in endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SigninResult {
    pub access_token: String,
    pub refresh_token: String,
    /// Some deployments rotate the CSRF token on sign-in.
    pub csrf_token: Option<String>,
    pub customer: Option<CustomerProfile>,
}

/// The signed-in customer. Never carries the password.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub customer_id: Option<i64>,
}
