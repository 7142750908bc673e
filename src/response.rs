//! Standard response envelope helpers.
//!
//! Every success payload is wrapped as `{"response": <payload>}` and every
//! failure as `{"error": "<message>"}`.

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub fn success(payload: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "response": payload })))
}

pub fn error_body(message: String) -> Value {
    json!({ "error": message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_wraps_payload_under_response() {
        let (status, Json(body)) = success(json!({ "updated": 1 }));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "response": { "updated": 1 } }));
    }

    #[test]
    fn error_body_is_flat_message() {
        assert_eq!(
            error_body("unknown table".into()),
            json!({ "error": "unknown table" })
        );
    }
}
