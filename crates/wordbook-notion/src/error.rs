use reqwest::StatusCode;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Database not found: {0}")]
    NotFound(String),

    #[error("Temporary failure: {0}")]
    Transient(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Map a non-success HTTP status to an error kind
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Auth(message),
            StatusCode::NOT_FOUND => RemoteError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => {
                RemoteError::Transient(message)
            }
            s if s.is_server_error() => RemoteError::Transient(message),
            _ => RemoteError::Rejected(format!("HTTP {status}: {message}")),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Transient(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_error_kinds() {
        let kind = |code: u16| RemoteError::from_status(StatusCode::from_u16(code).unwrap(), "x".into());

        assert!(matches!(kind(401), RemoteError::Auth(_)));
        assert!(matches!(kind(403), RemoteError::Auth(_)));
        assert!(matches!(kind(404), RemoteError::NotFound(_)));
        assert!(matches!(kind(429), RemoteError::Transient(_)));
        assert!(matches!(kind(502), RemoteError::Transient(_)));
        assert!(matches!(kind(400), RemoteError::Rejected(_)));
    }
}
