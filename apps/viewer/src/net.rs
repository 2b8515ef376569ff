//! Layer document fetch.
//!
//! Layer paths are fetched relative to the page location and parsed as
//! JSON; the document's shape is validated later, by the feature parser.

use thiserror::Error;

/// Failure to retrieve or decode a layer document. Recoverable; surfaced
/// per control.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for `{path}` failed: {detail}")]
    Request { path: String, detail: String },
    #[error("request for `{path}` failed with HTTP status {status}")]
    Status { path: String, status: u16 },
    #[error("response for `{path}` is not valid JSON: {detail}")]
    Body { path: String, detail: String },
}

/// Fetch one layer document. Any non-success HTTP status is an error.
#[cfg(target_arch = "wasm32")]
pub async fn fetch_layer(path: &str) -> Result<serde_json::Value, FetchError> {
    use gloo_net::http::Request;

    let response = Request::get(path)
        .send()
        .await
        .map_err(|err| FetchError::Request {
            path: path.to_string(),
            detail: err.to_string(),
        })?;
    if !response.ok() {
        return Err(FetchError::Status {
            path: path.to_string(),
            status: response.status(),
        });
    }
    response
        .json::<serde_json::Value>()
        .await
        .map_err(|err| FetchError::Body {
            path: path.to_string(),
            detail: err.to_string(),
        })
}
