use reqwest::StatusCode;
use serde::Deserialize;

/// Body shape the inventory API uses for rejected requests.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// Best human-readable reason carried by an error body, if any.
    pub fn reason(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cancelled by user")]
    Declined,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<validator::ValidationErrors> for ConsoleError {
    fn from(err: validator::ValidationErrors) -> Self {
        ConsoleError::ValidationError(err.to_string())
    }
}

impl ConsoleError {
    /// Builds an API error from a rejected response body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = match parsed.reason() {
            Some(reason) => reason.to_string(),
            None => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };

        if status == StatusCode::NOT_FOUND {
            return ConsoleError::NotFound(message);
        }

        ConsoleError::Api { status, message }
    }

    /// Text shown to the operator in a blocking alert.
    pub fn alert_message(&self) -> String {
        match self {
            ConsoleError::Api { message, .. } => message.clone(),
            ConsoleError::NotFound(msg)
            | ConsoleError::ValidationError(msg)
            | ConsoleError::InvalidOperation(msg)
            | ConsoleError::InvalidInput(msg) => msg.clone(),
            ConsoleError::Http(err) if err.is_timeout() => {
                "The server took too long to respond".to_string()
            }
            ConsoleError::Http(err) if err.is_connect() => {
                "Could not reach the server".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn is_declined(&self) -> bool {
        matches!(self, ConsoleError::Declined)
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_message_is_surfaced() {
        let err = ConsoleError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"message":"Supplier is required"}"#,
        );
        assert_eq!(err.alert_message(), "Supplier is required");
        assert!(matches!(err, ConsoleError::Api { status, .. } if status == StatusCode::BAD_REQUEST));
    }

    #[test]
    fn falls_back_to_error_field_then_reason_phrase() {
        let err = ConsoleError::from_response(
            StatusCode::CONFLICT,
            r#"{"error":"PO already received"}"#,
        );
        assert_eq!(err.alert_message(), "PO already received");

        let err = ConsoleError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>");
        assert_eq!(err.alert_message(), "Internal Server Error");
    }

    #[test]
    fn not_found_maps_to_dedicated_variant() {
        let err = ConsoleError::from_response(StatusCode::NOT_FOUND, "");
        assert!(matches!(err, ConsoleError::NotFound(_)));
    }
}
