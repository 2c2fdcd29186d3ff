//! Response handling shared by the HTTP transport clients.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::errors::{SyncError, SyncResult};

/// Map a failed send (DNS, TLS, connection reset, timeout) to a transport error.
pub(crate) fn send_failed(service: &str, operation: &str, err: &reqwest::Error) -> SyncError {
    SyncError::Transport(format!("{service} {operation} request failed: {err}"))
}

/// Pass successful responses through; map 401/403 to an authentication
/// failure and any other status to a transport failure.
pub(crate) async fn ensure_success(
    service: &str,
    operation: &str,
    resp: Response,
) -> SyncResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(SyncError::Authentication {
            service: service.to_string(),
            message: format!("{operation} returned {status}: {body}"),
        });
    }
    Err(SyncError::Transport(format!(
        "{service} {operation} returned {status}: {body}"
    )))
}

/// Check the status and decode the JSON body.
pub(crate) async fn decode<T: DeserializeOwned>(
    service: &str,
    operation: &str,
    resp: Response,
) -> SyncResult<T> {
    let resp = ensure_success(service, operation, resp).await?;
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| send_failed(service, operation, &e))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        SyncError::SerializationError(format!("{service} {operation} parse failed: {e}"))
    })
}
