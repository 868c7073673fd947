//! The `{headers, body}` envelope every ActiveNet response is wrapped in.
//!
//! `headers.response_code` signals the outcome: `"0000"` is success,
//! `"0001"` is "no results" (a successful empty result for searches),
//! anything else is a business failure.

use serde::{Deserialize, Serialize};

/// Response code for a successful call.
pub const RESPONSE_CODE_SUCCESS: &str = "0000";

/// Response code for a successful call that matched nothing.
pub const RESPONSE_CODE_EMPTY: &str = "0001";

/// Pagination state echoed back in the envelope headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageInfo {
    pub order_by: String,
    pub order_option: String,
    pub total_page: i64,
    pub total_records_per_page: i64,
    pub total_records: i64,
    pub page_number: i64,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            order_by: String::new(),
            order_option: "ASC".to_string(),
            total_page: 1,
            total_records_per_page: 20,
            total_records: 0,
            page_number: 1,
        }
    }
}

/// Envelope headers. `response_code` is required; a response without it
/// does not parse and is treated as a protocol error by the client layer.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseHeaders {
    pub response_code: String,
    #[serde(default)]
    pub response_message: String,
    #[serde(default)]
    pub page_info: PageInfo,
}

impl ResponseHeaders {
    /// True for `"0000"` and `"0001"` (empty result counts as success).
    pub fn is_success(&self) -> bool {
        self.response_code == RESPONSE_CODE_SUCCESS || self.response_code == RESPONSE_CODE_EMPTY
    }

    /// True for the `"0001"` empty-result code.
    pub fn is_empty_result(&self) -> bool {
        self.response_code == RESPONSE_CODE_EMPTY
    }
}

/// A parsed ActiveNet response. The body is kept as raw JSON; callers
/// deserialize the slice they care about.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    pub headers: ResponseHeaders,
    #[serde(default)]
    pub body: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_code_is_success() {
        let headers: ResponseHeaders = serde_json::from_value(serde_json::json!({
            "response_code": "0000",
            "response_message": "Successful",
        }))
        .unwrap();
        assert!(headers.is_success());
        assert!(!headers.is_empty_result());
    }

    #[test]
    fn empty_result_code_is_success() {
        let headers: ResponseHeaders = serde_json::from_value(serde_json::json!({
            "response_code": "0001",
        }))
        .unwrap();
        assert!(headers.is_success());
        assert!(headers.is_empty_result());
    }

    #[test]
    fn business_failure_code_is_not_success() {
        let headers: ResponseHeaders = serde_json::from_value(serde_json::json!({
            "response_code": "9999",
            "response_message": "Invalid credentials",
        }))
        .unwrap();
        assert!(!headers.is_success());
    }

    #[test]
    fn missing_response_code_fails_to_parse() {
        let result: Result<ResponseHeaders, _> = serde_json::from_value(serde_json::json!({
            "response_message": "no code here",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn envelope_without_body_defaults_to_null() {
        let envelope: ResponseEnvelope = serde_json::from_value(serde_json::json!({
            "headers": { "response_code": "0000" },
        }))
        .unwrap();
        assert!(envelope.body.is_null());
    }

    #[test]
    fn page_info_defaults() {
        let page_info = PageInfo::default();
        assert_eq!(page_info.page_number, 1);
        assert_eq!(page_info.total_records_per_page, 20);
        assert_eq!(page_info.order_option, "ASC");
    }

    #[test]
    fn unknown_header_fields_are_ignored() {
        let headers: ResponseHeaders = serde_json::from_value(serde_json::json!({
            "response_code": "0000",
            "some_future_field": { "nested": true },
        }))
        .unwrap();
        assert!(headers.is_success());
    }
}
