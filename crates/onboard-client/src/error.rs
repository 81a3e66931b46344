//! Client error types.

/// Errors from collaborator HTTP calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, TLS).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The collaborator answered with a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl ClientError {
    /// User-facing text from an error body, when the collaborator sent
    /// one as `{"message": ".."}` or `{"error": ".."}`.
    pub fn service_message(&self) -> Option<String> {
        let Self::ApiError { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        ["message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(body: &str) -> ClientError {
        ClientError::ApiError {
            endpoint: "POST /send".into(),
            status: 429,
            body: body.into(),
        }
    }

    #[test]
    fn service_message_reads_message_or_error() {
        assert_eq!(
            api_error(r#"{"message":"Too many attempts"}"#).service_message().as_deref(),
            Some("Too many attempts")
        );
        assert_eq!(
            api_error(r#"{"error":"quota exceeded"}"#).service_message().as_deref(),
            Some("quota exceeded")
        );
    }

    #[test]
    fn service_message_ignores_unusable_bodies() {
        assert_eq!(api_error("<html>502</html>").service_message(), None);
        assert_eq!(api_error(r#"{"message":"  "}"#).service_message(), None);
        assert_eq!(api_error(r#"{"error":{"code":1}}"#).service_message(), None);
    }
}
