use crate::error::reqwest::WrappedReqwestError;
use reqwest::{Client, Response};
use serde::Serialize;
use url::Url;

/// POSTs are never retried: the server may already have acted on the first one.
pub async fn post_json<B: Serialize + ?Sized>(
    client: &Client,
    url: Url,
    body: &B,
) -> Result<Response, WrappedReqwestError> {
    client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(WrappedReqwestError)
}
