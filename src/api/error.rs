use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-2xx answer; `message` is the server's own wording when it sent one
    #[error("{}", .message.as_deref().unwrap_or("request failed"))]
    Server { status: u16, message: Option<String> },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from auction service: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        ApiError::Server {
            status,
            message: Some(message.into()),
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The service understood the request and said no
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Server { status, .. } if (400..500).contains(status))
    }
}

/// Pull the human-readable reason out of an error body
pub fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"message":"Bid too low"}"#),
            Some("Bid too low".to_string())
        );
        assert_eq!(
            server_message(r#"{"error":"Player already sold"}"#),
            Some("Player already sold".to_string())
        );
        assert_eq!(server_message(r#"{"message":"  "}"#), None);
        assert_eq!(server_message("<html>502</html>"), None);
        assert_eq!(server_message(""), None);
    }

    #[test]
    fn test_rejection_classification() {
        assert!(ApiError::rejected(409, "stale").is_rejection());
        let server_fault = ApiError::Server {
            status: 503,
            message: None,
        };
        assert!(!server_fault.is_rejection());
        assert_eq!(server_fault.to_string(), "request failed");
        assert_eq!(ApiError::rejected(400, "nope").to_string(), "nope");
    }
}
