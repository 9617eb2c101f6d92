use super::*;
use std::error::Error as StdError;

#[test]
fn test_auth_error() {
    let error = Error::AuthError("Invalid base URL".to_string());

    // Test error message
    assert_eq!(
        error.to_string(),
        "Failed to authenticate or initialize GitHub client: Invalid base URL"
    );

    // Test error source
    assert!(error.source().is_none());
}

#[test]
fn test_invalid_response_error() {
    let error = Error::InvalidResponse;

    assert_eq!(error.to_string(), "Invalid response format");
    assert!(error.source().is_none());
}

#[test]
fn test_rate_limit_exceeded_error() {
    let error = Error::RateLimitExceeded;

    assert_eq!(error.to_string(), "Rate limit exceeded");
    assert!(error.is_recoverable());
}

#[test]
fn test_timeout_error_message() {
    let error = Error::Timeout(Duration::from_secs(10));

    assert_eq!(error.to_string(), "Request timed out after 10s");
    assert!(error.is_recoverable());
}

#[test]
fn test_not_found_is_terminal() {
    assert!(!Error::NotFound.is_recoverable());
    assert!(!Error::Http { status: 500 }.is_recoverable());
}

#[test]
fn test_from_status_mapping() {
    assert!(matches!(
        Error::from_status(StatusCode::NOT_FOUND),
        Error::NotFound
    ));
    assert!(matches!(
        Error::from_status(StatusCode::FORBIDDEN),
        Error::RateLimitExceeded
    ));
    assert!(matches!(
        Error::from_status(StatusCode::TOO_MANY_REQUESTS),
        Error::RateLimitExceeded
    ));
    assert!(matches!(
        Error::from_status(StatusCode::BAD_GATEWAY),
        Error::Http { status: 502 }
    ));
}

#[test]
fn test_deserialization_error_has_source() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error = Error::from(json_error);

    assert!(error
        .to_string()
        .starts_with("Failed to deserialize GitHub response"));
    assert!(error.source().is_some());
}

#[test]
fn test_error_is_send_sync() {
    // This test verifies that Error implements Send and Sync traits
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}
