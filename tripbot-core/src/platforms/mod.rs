// File: src/platforms/mod.rs
//
// Concrete HTTP clients for the remote collaborators. Each implements one of
// the capability traits from `tripbot_common::traits::api`.

use serde::de::DeserializeOwned;
use tracing::debug;
use crate::Error;

pub mod google;
pub mod line;

/// Reads a response body, mapping non-2xx statuses and undecodable bodies to
/// `Error::Platform` tagged with `context`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T, Error> {
    let status = response.status();
    let body_text = response.text().await?;

    if !status.is_success() {
        return Err(Error::Platform(format!("{}: HTTP {} => {}", context, status, body_text)));
    }

    debug!("{} response: {} bytes", context, body_text.len());
    serde_json::from_str(&body_text)
        .map_err(|e| Error::Platform(format!("{} parse error: {}", context, e)))
}

/// Like [`read_json`] for endpoints whose success body is irrelevant.
pub(crate) async fn expect_success(response: reqwest::Response, context: &str) -> Result<(), Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body_text = response.text().await.unwrap_or_default();
    Err(Error::Platform(format!("{}: HTTP {} => {}", context, status, body_text)))
}
