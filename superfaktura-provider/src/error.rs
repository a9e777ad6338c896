use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A credential field the resolver could not find in any source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialField {
    /// Account e-mail (`x-superfaktura-email` / `SUPERFAKTURA_EMAIL`).
    Email,
    /// API key (`x-superfaktura-api-key` / `SUPERFAKTURA_API_KEY`).
    ApiKey,
}

impl CredentialField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::ApiKey => "api_key",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to turn request headers and process configuration into an
/// [`UpstreamSession`](crate::UpstreamSession).
///
/// Resolution never touches the network, so these are always reported before
/// any upstream call is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionError {
    /// Required identity fields are absent from both headers and environment.
    #[error("Missing credentials: {}", join_fields(.fields))]
    MissingCredentials {
        /// Absent fields, `email` before `api_key`.
        fields: Vec<CredentialField>,
    },

    /// The country code is not in the fixed table and no URL override is set.
    #[error("Unsupported country code '{country}' (expected one of: sk, cz, at, sandbox-sk, sandbox-cz)")]
    UnsupportedCountry {
        /// The country code as supplied.
        country: String,
    },

    /// A session header was sent but carries no usable value (blank, or not
    /// valid UTF-8). It is not replaced by the environment value.
    #[error("Header '{name}' is present but empty or not valid UTF-8")]
    InvalidHeader {
        /// Lowercase header name.
        name: String,
    },
}

fn join_fields(fields: &[CredentialField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Unified error type for every SuperFaktura tool call.
///
/// All variants are terminal for the current call; nothing is retried
/// internally. The serialized form is what MCP callers see as the tool error
/// payload.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ApiError {
    /// Caller-supplied arguments violate a tool constraint.
    #[error("Invalid parameter '{field}': {detail}")]
    ValidationError {
        /// Name of the offending argument.
        field: String,
        /// What is wrong with it.
        detail: String,
    },

    /// Credentials or base URL could not be resolved.
    #[error("{0}")]
    ResolutionError(ResolutionError),

    /// The upstream API answered with a non-2xx status, or with a 2xx body
    /// flagged as an error.
    #[error("Upstream error (HTTP {status}): {message}")]
    UpstreamError {
        /// HTTP status code returned by the upstream API.
        status: u16,
        /// Best-effort human-readable message.
        message: String,
        /// The upstream's structured error payload, verbatim, when it was JSON.
        payload: Option<serde_json::Value>,
    },

    /// The upstream API could not be reached.
    #[error("Transport error: {detail}")]
    TransportError {
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    #[error("Request timeout: {detail}")]
    Timeout {
        /// Error details.
        detail: String,
    },

    /// A 2xx response body was not valid JSON.
    #[error("Parse error: {detail}")]
    ParseError {
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    #[error("Serialization error: {detail}")]
    SerializationError {
        /// Details about the serialization failure.
        detail: String,
    },
}

impl ApiError {
    /// Shorthand for [`ApiError::ValidationError`].
    pub fn validation(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            detail: detail.into(),
        }
    }

    /// Whether this is expected behavior (bad input, missing credentials,
    /// upstream 4xx), used to pick the log level.
    ///
    /// `true` should be logged at `warn`, `false` at `error`.
    /// **Keep this in sync when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ValidationError { .. } | Self::ResolutionError(_) => true,
            Self::UpstreamError { status, .. } => (400..500).contains(status),
            Self::TransportError { .. }
            | Self::Timeout { .. }
            | Self::ParseError { .. }
            | Self::SerializationError { .. } => false,
        }
    }

    /// HTTP status of an upstream failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ResolutionError> for ApiError {
    fn from(err: ResolutionError) -> Self {
        Self::ResolutionError(err)
    }
}

/// Convenience type alias for `Result<T, ApiError>`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_names_fields_in_order() {
        let err = ResolutionError::MissingCredentials {
            fields: vec![CredentialField::Email, CredentialField::ApiKey],
        };
        assert_eq!(err.to_string(), "Missing credentials: email, api_key");
    }

    #[test]
    fn unsupported_country_mentions_code() {
        let err = ResolutionError::UnsupportedCountry {
            country: "de".to_string(),
        };
        assert!(err.to_string().contains("'de'"));
    }

    #[test]
    fn invalid_header_serializes_name() {
        let err = ApiError::from(ResolutionError::InvalidHeader {
            name: "x-superfaktura-email".to_string(),
        });
        assert!(err.is_expected());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "invalid_header");
        assert_eq!(json["name"], "x-superfaktura-email");
    }

    #[test]
    fn upstream_error_serializes_with_code_tag() {
        let err = ApiError::UpstreamError {
            status: 404,
            message: "Not found".to_string(),
            payload: Some(serde_json::json!({"error": 1, "message": "Not found"})),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "UpstreamError");
        assert_eq!(json["status"], 404);
        assert_eq!(json["payload"]["message"], "Not found");
    }

    #[test]
    fn resolution_error_serializes_nested_kind() {
        let err = ApiError::from(ResolutionError::MissingCredentials {
            fields: vec![CredentialField::ApiKey],
        });
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "ResolutionError");
        assert_eq!(json["kind"], "missing_credentials");
        assert_eq!(json["fields"], serde_json::json!(["api_key"]));
    }

    #[test]
    fn expected_errors_classification() {
        assert!(ApiError::validation("page", "must be >= 1").is_expected());
        assert!(
            ApiError::UpstreamError {
                status: 401,
                message: String::new(),
                payload: None
            }
            .is_expected()
        );
        assert!(
            !ApiError::UpstreamError {
                status: 500,
                message: String::new(),
                payload: None
            }
            .is_expected()
        );
        assert!(
            !ApiError::TransportError {
                detail: "refused".into()
            }
            .is_expected()
        );
    }
}
