//! Errors surfaced by the characters client and their user-facing wording.

use reqwest::StatusCode;
use shared::{domain::CharacterId, error::ErrorCode};
use thiserror::Error;

/// The operation an error came from; selects the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchAll,
    Delete,
    Create,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-success HTTP status or transport failure.
    Network,
    /// A privileged action was attempted without a token.
    AuthRequired,
    /// The response body did not have the expected shape.
    Parse,
    /// The response arrived but was deliberately not applied.
    Ignored,
    /// A conflicting request is still in flight.
    Busy,
    Config,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: StatusCode },
    #[error("transport failure calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("a bearer token is required to {action}")]
    AuthRequired { action: &'static str },
    #[error("unexpected response body from {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("character list response #{seq} was superseded by a newer request")]
    Superseded { seq: u64 },
    #[error("view was unmounted before the response arrived")]
    Detached,
    #[error("a character list fetch is already in flight")]
    FetchInFlight,
    #[error("a delete for character {0} is already in flight")]
    DeleteInFlight(CharacterId),
    #[error("invalid api origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },
    #[error("failed to build http client: {source}")]
    HttpClient {
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Status { .. } | ClientError::Transport { .. } => ErrorKind::Network,
            ClientError::AuthRequired { .. } => ErrorKind::AuthRequired,
            ClientError::Parse { .. } => ErrorKind::Parse,
            ClientError::Superseded { .. } | ClientError::Detached => ErrorKind::Ignored,
            ClientError::FetchInFlight | ClientError::DeleteInFlight(_) => ErrorKind::Busy,
            ClientError::InvalidOrigin { .. } | ClientError::HttpClient { .. } => {
                ErrorKind::Config
            }
        }
    }

    pub fn status_code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Status { status, .. } => Some(ErrorCode::from_status(status.as_u16())),
            _ => None,
        }
    }

    /// Message shown to the user in place of the technical error.
    ///
    /// List fetches never distinguish client from server failures; mutations
    /// rejected with 401/403 get a sign-in hint.
    pub fn user_message(&self, operation: Operation) -> String {
        let reauth = operation != Operation::FetchAll
            && self.status_code().is_some_and(ErrorCode::requires_reauth);
        if reauth {
            return "Your session is missing or has expired. Please sign in again.".to_string();
        }

        let message = match (self, operation) {
            (ClientError::AuthRequired { .. }, Operation::Delete) => {
                "You must be signed in to delete a character."
            }
            (ClientError::AuthRequired { .. }, _) => "You must be signed in to do that.",
            (ClientError::DeleteInFlight(_), _) => "This character is already being deleted.",
            (ClientError::FetchInFlight, _) => "Characters are already loading.",
            (ClientError::InvalidOrigin { .. }, _) => {
                "The characters service address is not configured correctly."
            }
            (ClientError::HttpClient { .. }, _) => {
                "The characters service client could not be started."
            }
            (_, Operation::FetchAll) => "Failed to retrieve characters. Please try again later.",
            (_, Operation::Delete) => "Unable to delete the character. Please try again later.",
            (_, Operation::Create) => "Unable to create the character. Please try again later.",
        };
        message.to_string()
    }
}
