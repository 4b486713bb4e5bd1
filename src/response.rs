// Response parsing: turns the raw JSON body into a typed `Obfuscation`.
// The service reports failures inside a 200 response (`success: false`),
// so this is where application-level errors surface.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;

const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Wire shape of the service reply. Every field is optional on the wire.
///
/// `success` and `error` are kept as raw values: any falsy `success` means
/// failure, and a non-string `error` is still shown to the user.
#[derive(Deserialize, Debug, Default)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: Option<Value>,
    #[serde(default)]
    pub obfuscated_code: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub stats: Map<String, Value>,
    #[serde(default)]
    pub processing_time: Option<f64>,
}

impl ApiResponse {
    pub fn succeeded(&self) -> bool {
        self.success.as_ref().is_some_and(is_truthy)
    }

    fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            None | Some(Value::Null) => UNKNOWN_ERROR.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// false, null, 0, "", [] and {} are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

// Stats are informational only; anything but an object is dropped.
fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

/// A successful obfuscation result.
#[derive(Debug, Clone, PartialEq)]
pub struct Obfuscation {
    pub code: String,
    pub stats: Map<String, Value>,
    /// Server-side processing time in seconds.
    pub processing_time: f64,
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Invalid response format")]
    InvalidFormat(#[source] serde_json::Error),
    #[error("Obfuscation failed: {0}")]
    Failed(String),
    #[error("No obfuscated code in response")]
    MissingCode,
}

pub fn parse_response(body: &Value) -> Result<Obfuscation, ResponseError> {
    if !body.is_object() {
        let err = serde_json::Error::custom("expected a JSON object");
        return Err(ResponseError::InvalidFormat(err));
    }
    let response = ApiResponse::deserialize(body).map_err(ResponseError::InvalidFormat)?;

    if !response.succeeded() {
        return Err(ResponseError::Failed(response.error_message()));
    }

    let code = response
        .obfuscated_code
        .filter(|code| !code.is_empty())
        .ok_or(ResponseError::MissingCode)?;

    Ok(Obfuscation {
        code,
        stats: response.stats,
        processing_time: response.processing_time.unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_success() {
        let body = json!({
            "success": true,
            "obfuscated_code": "exec('x')",
            "stats": { "compression_ratio": 0.42, "mutation_id": "m-17" },
            "processing_time": 1.25
        });

        let parsed = parse_response(&body).unwrap();
        assert_eq!(parsed.code, "exec('x')");
        assert_eq!(parsed.processing_time, 1.25);
        assert_eq!(parsed.stats["mutation_id"], json!("m-17"));
        assert_eq!(parsed.stats.len(), 2);
    }

    #[test]
    fn optional_fields_default() {
        let body = json!({ "success": true, "obfuscated_code": "X" });
        let parsed = parse_response(&body).unwrap();
        assert!(parsed.stats.is_empty());
        assert_eq!(parsed.processing_time, 0.0);
    }

    #[test]
    fn null_fields_default() {
        let body = json!({
            "success": true,
            "obfuscated_code": "X",
            "stats": null,
            "processing_time": null
        });
        let parsed = parse_response(&body).unwrap();
        assert!(parsed.stats.is_empty());
        assert_eq!(parsed.processing_time, 0.0);
    }

    #[test]
    fn integer_processing_time_is_accepted() {
        let body = json!({ "success": true, "obfuscated_code": "X", "processing_time": 3 });
        assert_eq!(parse_response(&body).unwrap().processing_time, 3.0);
    }

    #[test]
    fn failure_surfaces_server_error_verbatim() {
        let body = json!({ "success": false, "error": "Syntax error on line 3: unexpected ')'" });
        let err = parse_response(&body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Obfuscation failed: Syntax error on line 3: unexpected ')'"
        );
    }

    #[test]
    fn failure_without_message_uses_default() {
        let err = parse_response(&json!({ "success": false })).unwrap_err();
        assert_eq!(err.to_string(), "Obfuscation failed: Unknown error occurred");
    }

    #[test]
    fn missing_success_counts_as_failure() {
        let err = parse_response(&json!({ "obfuscated_code": "X" })).unwrap_err();
        assert!(matches!(err, ResponseError::Failed(_)));
    }

    #[test]
    fn missing_or_empty_code_is_rejected() {
        for body in [
            json!({ "success": true }),
            json!({ "success": true, "obfuscated_code": "" }),
            json!({ "success": true, "obfuscated_code": null }),
        ] {
            let err = parse_response(&body).unwrap_err();
            assert_eq!(err.to_string(), "No obfuscated code in response");
        }
    }

    #[test]
    fn non_object_body_is_invalid() {
        for body in [
            json!([1, 2, 3]),
            json!("ok"),
            json!(null),
            json!({ "success": true, "obfuscated_code": 42 }),
        ] {
            let err = parse_response(&body).unwrap_err();
            assert!(matches!(err, ResponseError::InvalidFormat(_)), "{body}");
        }
    }

    #[test]
    fn falsy_success_surfaces_server_error() {
        for success in [json!(0), json!(null), json!(""), json!([]), json!({}), json!(false)] {
            let body = json!({ "success": success.clone(), "error": "boom" });
            let err = parse_response(&body).unwrap_err();
            assert_eq!(err.to_string(), "Obfuscation failed: boom", "success = {success}");
        }
    }

    #[test]
    fn truthy_non_bool_success_is_accepted() {
        for success in [json!(1), json!("yes"), json!([0])] {
            let body = json!({ "success": success, "obfuscated_code": "X" });
            assert_eq!(parse_response(&body).unwrap().code, "X");
        }
    }

    #[test]
    fn non_string_error_is_still_shown() {
        let body = json!({ "success": false, "error": { "code": 7 } });
        let err = parse_response(&body).unwrap_err();
        assert_eq!(err.to_string(), r#"Obfuscation failed: {"code":7}"#);
    }

    #[test]
    fn malformed_stats_do_not_discard_the_result() {
        for stats in [json!([]), json!("n/a"), json!(3)] {
            let body = json!({
                "success": true,
                "obfuscated_code": "X",
                "stats": stats,
                "processing_time": 0.5
            });
            let parsed = parse_response(&body).unwrap();
            assert_eq!(parsed.code, "X");
            assert!(parsed.stats.is_empty());
            assert_eq!(parsed.processing_time, 0.5);
        }
    }
}
