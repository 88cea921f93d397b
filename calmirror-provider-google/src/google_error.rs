//! Classification of google-calendar client errors.

use google_calendar::ClientError;
use reqwest::StatusCode;

/// The client error somewhere in an anyhow chain, if any.
pub fn find_client_error(e: &anyhow::Error) -> Option<&ClientError> {
    e.chain().find_map(|cause| cause.downcast_ref::<ClientError>())
}

/// The request never got an answer: connect failure or timeout.
pub fn is_connectivity(e: &ClientError) -> bool {
    match e {
        ClientError::ReqwestError(http) => http.is_connect() || http.is_timeout(),
        ClientError::ReqwestMiddleWareError(http) => http.is_connect() || http.is_timeout(),
        _ => false,
    }
}

/// Google answered 410: the event was already deleted.
pub fn is_gone(e: &ClientError) -> bool {
    matches!(e, ClientError::HttpError { status, .. } if *status == StatusCode::GONE)
}
