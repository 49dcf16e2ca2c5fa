use crate::core::errors::{ApiError, ApiErrorCode, NexoError, RequestError};
use serde_json::Value;
use tracing::warn;

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// `errorCode` may arrive as a number or a numeric string
fn known_code(code: &Value) -> Option<ApiErrorCode> {
    let numeric = match code {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    ApiErrorCode::from_code(numeric)
}

/// Turn a raw HTTP response into the decoded payload or a typed failure.
///
/// `request_echo` is the method and URL of the request and ends up in
/// transport errors. An `errorCode` in the body wins over the HTTP status.
pub fn classify(status: u16, body: &str, request_echo: &str) -> Result<Value, NexoError> {
    let Ok(payload) = serde_json::from_str::<Value>(body) else {
        let err = if is_success(status) {
            RequestError::InvalidBody {
                request: request_echo.to_string(),
                message: "response body is not valid JSON".to_string(),
            }
        } else {
            RequestError::Status {
                status,
                request: request_echo.to_string(),
                body: body.to_string(),
            }
        };
        warn!(status, request = %request_echo, "Undecodable response");
        return Err(err.into());
    };

    if let Some(code) = payload.get("errorCode").filter(|code| !code.is_null()) {
        let message = payload
            .get("errorMessage")
            .and_then(Value::as_str)
            .map(str::to_string);

        return match known_code(code) {
            Some(known) => {
                warn!(code = known.code(), request = %request_echo, "API error");
                Err(ApiError::new(known, message, payload.clone()).into())
            }
            None => {
                warn!(code = %code, request = %request_echo, "Unrecognised API error code");
                Err(RequestError::UnknownErrorCode {
                    code: code.clone(),
                    message: message.unwrap_or_default(),
                    request: request_echo.to_string(),
                }
                .into())
            }
        };
    }

    if !is_success(status) {
        warn!(status, request = %request_echo, "HTTP failure without error code");
        return Err(RequestError::Status {
            status,
            request: request_echo.to_string(),
            body: body.to_string(),
        }
        .into());
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use serde_json::json;

    const ECHO: &str = "GET https://pro-api.nexo.io/api/v1/quote";

    #[test]
    fn test_known_code_becomes_api_error() {
        let body = r#"{"errorCode":100,"errorMessage":"API Key doesn't exist"}"#;
        let err = classify(401, body, ECHO).unwrap_err();

        let api = err.api_error().expect("api error");
        assert_eq!(api.code(), 100);
        assert_eq!(api.message(), "API Key doesn't exist");
        assert_eq!(
            api.raw_response(),
            &json!({"errorCode": 100, "errorMessage": "API Key doesn't exist"})
        );
    }

    #[test]
    fn test_known_code_wins_over_success_status() {
        let err = classify(200, r#"{"errorCode":"301"}"#, ECHO).unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(err.api_error().map(ApiError::message), Some("Rate limit exceeded."));
    }

    #[test]
    fn test_unknown_code_becomes_request_error() {
        let err = classify(400, r#"{"errorCode":999,"errorMessage":"odd"}"#, ECHO).unwrap_err();
        match err {
            NexoError::Request(RequestError::UnknownErrorCode {
                code,
                message,
                request,
            }) => {
                assert_eq!(code, json!(999));
                assert_eq!(message, "odd");
                assert_eq!(request, ECHO);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_json_failure_status() {
        let err = classify(502, "<html>Bad Gateway</html>", ECHO).unwrap_err();
        match err {
            NexoError::Request(ref inner @ RequestError::Status { .. }) => {
                assert_eq!(inner.status(), Some(502));
                assert!(err.to_string().contains(ECHO));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_json_success_status() {
        let err = classify(200, "not json", ECHO).unwrap_err();
        assert!(matches!(
            err,
            NexoError::Request(RequestError::InvalidBody { .. })
        ));
    }

    #[test]
    fn test_json_without_code_success_passes_through() {
        let body = r#"{"pairs":["BTC/USD"],"minLimits":{}}"#;
        let payload = classify(200, body, ECHO).unwrap();
        assert_eq!(payload, json!({"pairs": ["BTC/USD"], "minLimits": {}}));

        let payload = classify(200, "[]", ECHO).unwrap();
        assert_eq!(payload, json!([]));
    }

    #[test]
    fn test_json_without_code_failure_status() {
        let err = classify(500, r#"{"message":"boom"}"#, ECHO).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Request);
        assert!(matches!(
            err,
            NexoError::Request(RequestError::Status { status: 500, .. })
        ));
    }
}
