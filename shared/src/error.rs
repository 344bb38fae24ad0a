use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selector::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Server,
    GraphQl,
    Decode,
    Request,
    Validation,
    Selection,
    Paging,
    Config,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Server => "SERVER_ERROR",
            Self::GraphQl => "GRAPHQL_ERROR",
            Self::Decode => "DESERIALIZATION_ERROR",
            Self::Request => "REQUEST_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::Selection => "SELECTION_ERROR",
            Self::Paging => "PAGING_ERROR",
            Self::Config => "CONFIG_ERROR",
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }
}

/// Failure of a query or mutation against the gateway.
///
/// An empty collection is never a `FetchError`; it decodes to `Ok(vec![])`.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport failure: {message}")]
    Transport { message: String },

    #[error("HTTP error {status}")]
    Status { status: u16 },

    #[error("graphql error: {}", .messages.join("; "))]
    GraphQl { messages: Vec<String> },

    #[error("response carried no data")]
    MissingData,

    #[error("invalid response: {reason}")]
    Decode { reason: String },

    #[error("request could not be built: {reason}")]
    Request { reason: String },
}

impl FetchError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Network,
            Self::Status { .. } => ErrorKind::Server,
            Self::GraphQl { .. } => ErrorKind::GraphQl,
            Self::MissingData | Self::Decode { .. } => ErrorKind::Decode,
            Self::Request { .. } => ErrorKind::Request,
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status } => *status == 408 || *status == 429 || *status >= 500,
            other => other.kind().is_retryable(),
        }
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } => {
                "Unable to connect. Please check your internet connection and try again.".into()
            }
            Self::Status { status } if *status == 401 || *status == 403 => {
                "Your session has expired. Please sign in again.".into()
            }
            Self::Status { .. } | Self::GraphQl { .. } => {
                "The server could not complete the request. Please try again.".into()
            }
            Self::MissingData | Self::Decode { .. } | Self::Request { .. } => {
                "An unexpected error occurred. Please try again or contact support.".into()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequiredField {
    CenterName,
    Description,
    HouseNumber,
    PhoneNumber,
    Region,
    Zone,
    Woreda,
    LoginPhoneNumber,
    Password,
}

impl RequiredField {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CenterName => "OSSC Name",
            Self::Description => "Description",
            Self::HouseNumber => "House Number",
            Self::PhoneNumber | Self::LoginPhoneNumber => "Phone Number",
            Self::Region => "Region",
            Self::Zone => "Zone or Sub-city",
            Self::Woreda => "Woreda or District",
            Self::Password => "Password",
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{} is required", .field.label())]
    MissingField { field: RequiredField },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{level:?} cannot be chosen before its parent")]
    ParentNotSelected { level: Level },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum PageError {
    #[error("page {index} is out of range ({page_count} pages)")]
    OutOfRange { index: usize, page_count: usize },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("page size must be at least 1")]
    ZeroPageSize,
}

impl ConfigError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_is_not_modelled_as_error() {
        let ok: Result<Vec<u8>, FetchError> = Ok(vec![]);
        assert!(ok.is_ok());
    }

    #[test]
    fn retryable_classification() {
        assert!(FetchError::Transport {
            message: "reset".into()
        }
        .is_retryable());
        assert!(FetchError::Status { status: 503 }.is_retryable());
        assert!(FetchError::Status { status: 429 }.is_retryable());
        assert!(!FetchError::Status { status: 400 }.is_retryable());
        assert!(!FetchError::GraphQl {
            messages: vec!["field not found".into()]
        }
        .is_retryable());
        assert!(!FetchError::MissingData.is_retryable());
    }

    #[test]
    fn graphql_messages_are_joined() {
        let err = FetchError::GraphQl {
            messages: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "graphql error: a; b");
        assert_eq!(err.kind().code(), "GRAPHQL_ERROR");
    }

    #[test]
    fn auth_status_has_session_message() {
        let msg = FetchError::Status { status: 401 }.user_message();
        assert!(msg.contains("sign in"));
    }

    #[test]
    fn validation_message_uses_field_label() {
        let err = ValidationError::MissingField {
            field: RequiredField::Woreda,
        };
        assert_eq!(err.to_string(), "Woreda or District is required");
    }
}
