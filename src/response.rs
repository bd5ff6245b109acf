//!
//! # Response Envelope
//!
//! Every API endpoint answers with an [`ApiResponse`]: a success flag, an optional
//! payload, the HTTP status code it was sent with, and an ordered list of
//! human-readable error messages.

use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

/// Uniform wrapper for API results.
///
/// Serialized as `{ isSuccessful, result, statusCode, errors }`. The `status_code`
/// always mirrors the transport status of the response carrying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub is_successful: bool,
    pub result: Option<T>,
    pub status_code: u16,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A successful envelope carrying `result`.
    pub fn success(status: StatusCode, result: T) -> Self {
        Self {
            is_successful: true,
            result: Some(result),
            status_code: status.as_u16(),
            errors: Vec::new(),
        }
    }

    /// Shorthand for a `200 OK` success envelope.
    pub fn ok(result: T) -> Self {
        Self::success(StatusCode::OK, result)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Builds the HTTP response, using the envelope's status code as the transport status.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status()).json(self)
    }
}

impl ApiResponse<()> {
    /// A failed envelope with no payload.
    pub fn failure(status: StatusCode, errors: Vec<String>) -> Self {
        Self {
            is_successful: false,
            result: None,
            status_code: status.as_u16(),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let envelope = ApiResponse::ok(json!({ "id": 1, "name": "Books" }));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            json!({
                "isSuccessful": true,
                "result": { "id": 1, "name": "Books" },
                "statusCode": 200,
                "errors": []
            })
        );
    }

    #[test]
    fn test_failure_envelope_shape() {
        let envelope =
            ApiResponse::failure(StatusCode::BAD_REQUEST, vec!["Name already exists".into()]);
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["isSuccessful"], false);
        assert!(value["result"].is_null());
        assert_eq!(value["statusCode"], 400);
        assert_eq!(value["errors"], json!(["Name already exists"]));
    }

    #[test]
    fn test_into_response_uses_envelope_status() {
        let response = ApiResponse::failure(StatusCode::NOT_FOUND, Vec::new()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
