use reqwest::StatusCode;
use thiserror::Error;

/// Failure modes of the token refresh protocol.
///
/// Every variant is terminal for the session: the credential store is
/// cleared before the error is returned, so a caller seeing a
/// `RefreshError` can treat the user as logged out.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("no refresh token in store")]
    MissingToken,

    #[error("refresh rejected with status {0}")]
    Rejected(StatusCode),

    #[error("network error during refresh: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed refresh response")]
    MalformedResponse,
}
