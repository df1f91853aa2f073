use std::io;
use thiserror::Error;

/// Unified error type for the chat client
#[derive(Error, Debug)]
pub enum ChatError {
    /// The backend answered with a non-success status or an unusable body
    #[error("API error: {0}")]
    Api(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),
}

impl ChatError {
    /// Builds an [`ChatError::Api`] from a failed HTTP exchange.
    ///
    /// The backend reports failures as `{"detail": "..."}`; when that shape is
    /// present the detail becomes the message, otherwise the raw body is used.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));

        match detail {
            Some(detail) => ChatError::Api(format!("{} ({})", detail, status)),
            None if body.trim().is_empty() => {
                ChatError::Api(format!("backend returned {}", status))
            }
            None => ChatError::Api(format!("backend returned {}: {}", status, body.trim())),
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ChatError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            ChatError::Api(format!("API returned error status: {}", err))
        } else if err.is_decode() {
            ChatError::Serialization(format!("Malformed response body: {}", err))
        } else {
            ChatError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for ChatError {
    fn from(err: serde_yml::Error) -> Self {
        ChatError::Serialization(format!("YAML error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn detail_body_becomes_the_message() {
        let err = ChatError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail":"Model must be one of: a, b"}"#,
        );
        assert_eq!(
            err.to_string(),
            "API error: Model must be one of: a, b (400 Bad Request)"
        );
    }

    #[test]
    fn plain_body_is_kept_verbatim() {
        let err = ChatError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom\n");
        assert_eq!(
            err.to_string(),
            "API error: backend returned 500 Internal Server Error: boom"
        );
    }

    #[test]
    fn empty_body_still_names_the_status() {
        let err = ChatError::from_status(StatusCode::BAD_GATEWAY, "");
        assert!(err.to_string().contains("502"));
    }
}
