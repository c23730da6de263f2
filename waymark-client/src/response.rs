//! Turning raw HTTP responses into JSON bodies or classified errors.
//!
//! Most endpoints report failures through a top-level `status` field on an
//! HTTP 200 body. The roads endpoints instead use HTTP status codes with a
//! nested `error` object, handled by [`RoadsDecoder`].

use serde_json::Value;

use crate::MapsError;
use crate::error::response_error;
use crate::transport::RawResponse;

/// Decode a response into its JSON body or a classified error.
pub trait ResponseDecoder: Send + Sync {
    /// Decode `response`.
    ///
    /// # Errors
    ///
    /// Returns the [`MapsError`] the response represents.
    fn decode(&self, response: &RawResponse) -> Result<Value, MapsError>;
}

impl<F> ResponseDecoder for F
where
    F: Fn(&RawResponse) -> Result<Value, MapsError> + Send + Sync,
{
    fn decode(&self, response: &RawResponse) -> Result<Value, MapsError> {
        self(response)
    }
}

/// Decoder for endpoints reporting a top-level `status` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDecoder;

impl ResponseDecoder for DefaultDecoder {
    fn decode(&self, response: &RawResponse) -> Result<Value, MapsError> {
        check_response_status(response)?;
        let body = response
            .json()
            .map_err(|_| response_error!(Api, MALFORMED, response))?;
        check_body_status(response, body)
    }
}

/// Decoder for the roads endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoadsDecoder;

impl ResponseDecoder for RoadsDecoder {
    fn decode(&self, response: &RawResponse) -> Result<Value, MapsError> {
        let Ok(body) = response.json() else {
            if response.status != 200 {
                check_response_status(response)?;
            }
            return Err(response_error!(Api, MALFORMED, response));
        };
        if response.status == 200 {
            return Ok(body);
        }
        Err(body.get("error").map_or_else(
            || response_error!(Api, "Unknown error", response),
            |error| classify_roads_error(response, error),
        ))
    }
}

const MALFORMED: &str = "Received a malformed response.";
const INVALID_KEY_MESSAGE: &str = "The provided API key is invalid.";

/// Classify a response by HTTP status alone.
///
/// # Errors
///
/// Returns the error class for any status outside `200..=299`.
pub fn check_response_status(response: &RawResponse) -> Result<(), MapsError> {
    if response.is_success() {
        return Ok(());
    }
    match response.status {
        301 | 302 | 303 | 307 => Err(response_error!(Redirect, "Redirected", response)),
        401 => Err(response_error!(Client, "Unauthorized", response)),
        304 | 400 | 402..=499 => Err(response_error!(Client, "Invalid request", response)),
        500..=599 => Err(response_error!(Server, "Server error", response)),
        status => Err(response_error!(
            Unknown,
            format!("Unexpected HTTP status {status}"),
            response
        )),
    }
}

fn check_body_status(response: &RawResponse, body: Value) -> Result<Value, MapsError> {
    let status = body.get("status").and_then(Value::as_str).unwrap_or_default();
    let message = body
        .get("error_message")
        .and_then(Value::as_str)
        .unwrap_or(status);
    match status {
        "OK" | "ZERO_RESULTS" => Ok(body),
        "OVER_QUERY_LIMIT" => Err(response_error!(RateLimit, message, response)),
        "REQUEST_DENIED" => Err(response_error!(RequestDenied, message, response)),
        "INVALID_REQUEST" => Err(response_error!(InvalidRequest, message, response)),
        "" => Err(response_error!(Api, "Response did not include a status", response)),
        _ => Err(response_error!(Api, message, response)),
    }
}

fn classify_roads_error(response: &RawResponse, error: &Value) -> MapsError {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    match error.get("status").and_then(Value::as_str) {
        Some("INVALID_ARGUMENT") if message == INVALID_KEY_MESSAGE => {
            response_error!(RequestDenied, message, response)
        }
        Some("INVALID_ARGUMENT") => response_error!(InvalidRequest, message, response),
        Some("PERMISSION_DENIED") => response_error!(RequestDenied, message, response),
        Some("RESOURCE_EXHAUSTED") => response_error!(RateLimit, message, response),
        _ => response_error!(Api, message, response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn ok(body: &Value) -> RawResponse {
        RawResponse::new(200, body.to_string())
    }

    #[rstest]
    #[case(200, true)]
    #[case(299, true)]
    #[case(301, false)]
    #[case(404, false)]
    fn success_statuses_pass(#[case] status: u16, #[case] passes: bool) {
        assert_eq!(check_response_status(&RawResponse::new(status, "")).is_ok(), passes);
    }

    #[rstest]
    #[case(301)]
    #[case(302)]
    #[case(303)]
    #[case(307)]
    fn redirects_are_classified(#[case] status: u16) {
        assert!(matches!(
            check_response_status(&RawResponse::new(status, "")),
            Err(MapsError::Redirect { .. })
        ));
    }

    #[rstest]
    #[case(304)]
    #[case(400)]
    #[case(401)]
    #[case(403)]
    #[case(499)]
    fn client_errors_are_classified(#[case] status: u16) {
        assert!(matches!(
            check_response_status(&RawResponse::new(status, "")),
            Err(MapsError::Client { .. })
        ));
    }

    #[rstest]
    fn unauthorized_has_its_own_message() {
        let error = check_response_status(&RawResponse::new(401, "")).expect_err("401 fails");
        assert_eq!(error.to_string(), "Unauthorized");
    }

    #[rstest]
    #[case(500)]
    #[case(503)]
    #[case(599)]
    fn server_errors_are_classified(#[case] status: u16) {
        assert!(matches!(
            check_response_status(&RawResponse::new(status, "")),
            Err(MapsError::Server { .. })
        ));
    }

    #[rstest]
    #[case(100)]
    #[case(305)]
    #[case(600)]
    fn other_statuses_are_unknown(#[case] status: u16) {
        assert!(matches!(
            check_response_status(&RawResponse::new(status, "")),
            Err(MapsError::Unknown { .. })
        ));
    }

    #[rstest]
    #[case("OK")]
    #[case("ZERO_RESULTS")]
    fn successful_body_statuses_return_the_body(#[case] status: &str) {
        let body = json!({"status": status, "results": []});
        assert_eq!(DefaultDecoder.decode(&ok(&body)), Ok(body));
    }

    #[rstest]
    fn over_query_limit_is_rate_limited() {
        let body = json!({"status": "OVER_QUERY_LIMIT"});
        let error = DefaultDecoder.decode(&ok(&body)).expect_err("quota error");
        assert!(matches!(error, MapsError::RateLimit { .. }));
        assert!(error.is_retriable());
    }

    #[rstest]
    fn request_denied_carries_the_service_message() {
        let body = json!({"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."});
        let error = DefaultDecoder.decode(&ok(&body)).expect_err("denied");
        assert!(matches!(error, MapsError::RequestDenied { .. }));
        assert_eq!(error.to_string(), "The provided API key is invalid.");
        assert_eq!(error.response().map(|r| r.status), Some(200));
    }

    #[rstest]
    fn invalid_request_is_classified() {
        let body = json!({"status": "INVALID_REQUEST"});
        assert!(matches!(
            DefaultDecoder.decode(&ok(&body)),
            Err(MapsError::InvalidRequest { .. })
        ));
    }

    #[rstest]
    #[case(json!({"status": "UNKNOWN_ERROR", "error_message": "try again"}))]
    #[case(json!({"results": []}))]
    fn other_body_statuses_are_api_errors(#[case] body: Value) {
        assert!(matches!(
            DefaultDecoder.decode(&ok(&body)),
            Err(MapsError::Api { .. })
        ));
    }

    #[rstest]
    fn malformed_success_bodies_are_api_errors() {
        let error = DefaultDecoder
            .decode(&RawResponse::new(200, "<html>"))
            .expect_err("malformed");
        assert!(matches!(error, MapsError::Api { .. }));
        assert_eq!(error.to_string(), MALFORMED);
    }

    #[rstest]
    fn roads_success_returns_the_body() {
        let body = json!({"snappedPoints": []});
        assert_eq!(RoadsDecoder.decode(&ok(&body)), Ok(body));
    }

    #[rstest]
    #[case("INVALID_ARGUMENT", "The provided API key is invalid.", "RequestDenied")]
    #[case("INVALID_ARGUMENT", "placeId value is malformed", "InvalidRequest")]
    #[case("PERMISSION_DENIED", "denied", "RequestDenied")]
    #[case("RESOURCE_EXHAUSTED", "quota", "RateLimit")]
    #[case("INTERNAL", "boom", "Api")]
    fn roads_errors_are_classified(
        #[case] status: &str,
        #[case] message: &str,
        #[case] expected: &str,
    ) {
        let body = json!({"error": {"code": 400, "status": status, "message": message}});
        let error = RoadsDecoder
            .decode(&RawResponse::new(400, body.to_string()))
            .expect_err("roads error");
        let kind = match error {
            MapsError::RequestDenied { .. } => "RequestDenied",
            MapsError::InvalidRequest { .. } => "InvalidRequest",
            MapsError::RateLimit { .. } => "RateLimit",
            MapsError::Api { .. } => "Api",
            _ => "other",
        };
        assert_eq!(kind, expected);
    }

    #[rstest]
    fn roads_malformed_success_is_an_api_error() {
        let error = RoadsDecoder
            .decode(&RawResponse::new(200, "Unknown format."))
            .expect_err("malformed");
        assert_eq!(error.to_string(), MALFORMED);
    }

    #[rstest]
    fn roads_unparseable_failures_use_the_status() {
        assert!(matches!(
            RoadsDecoder.decode(&RawResponse::new(503, "Service Unavailable")),
            Err(MapsError::Server { .. })
        ));
    }

    #[rstest]
    fn roads_failures_without_error_object_are_api_errors() {
        let error = RoadsDecoder
            .decode(&RawResponse::new(400, "{}"))
            .expect_err("unknown");
        assert_eq!(error.to_string(), "Unknown error");
    }

    #[rstest]
    fn closures_are_decoders() {
        let decoder = |response: &RawResponse| -> Result<Value, MapsError> {
            Ok(Value::from(response.status))
        };
        assert_eq!(decoder.decode(&RawResponse::new(204, "")), Ok(json!(204)));
    }
}
