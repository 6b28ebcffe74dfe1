use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered `{ "success": false, "message": ... }`.
    #[error("{message} ({status})")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Invalid session signing key")]
    InvalidKey,
}

impl ClientError {
    /// The token was missing, expired or names a deleted user.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::NotLoggedIn | ClientError::Api { status: 401, .. })
    }
}
