use crate::http::retryable::Retryable;
use reqwest::StatusCode;
use thiserror::Error;

// reqwest::Error's Display already includes every source, so the inner
// error is deliberately not exposed as #[source].
#[derive(Error, Debug)]
#[error("{}", .0)]
pub struct WrappedReqwestError(pub reqwest::Error);

impl WrappedReqwestError {
    pub fn status(&self) -> Option<StatusCode> {
        self.0.status()
    }
}

impl Retryable for WrappedReqwestError {
    fn is_retryable(&self) -> bool {
        let err = &self.0;
        err.is_timeout()
            || err.is_connect()
            || matches!(
                err.status(),
                Some(
                    StatusCode::REQUEST_TIMEOUT
                        | StatusCode::TOO_MANY_REQUESTS
                        | StatusCode::INTERNAL_SERVER_ERROR
                        | StatusCode::BAD_GATEWAY
                        | StatusCode::SERVICE_UNAVAILABLE
                        | StatusCode::GATEWAY_TIMEOUT
                )
            )
    }
}
