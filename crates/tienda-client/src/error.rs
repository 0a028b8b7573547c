//! # Client Error Types
//!
//! Error types for network, configuration and session failures.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   FetchError    │  │  Configuration  │  │     Session             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Timeout     ↻  │  │  InvalidConfig  │  │  InvalidCredentials     │ │
//! │  │  Http        ↻  │  │  InvalidUrl     │  │  NotAuthenticated       │ │
//! │  │  Transport   ↻  │  │  ConfigLoad     │  │                         │ │
//! │  │  Cancelled      │  │  ConfigSave     │  │                         │ │
//! │  │  Decode         │  │                 │  │                         │ │
//! │  │  Encode         │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ↻ = retried by ResilientFetcher while retries remain                  │
//! │                                                                         │
//! │  ClientError wraps all of the above plus CoreError / StorageError and  │
//! │  turns them into a user-facing message.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use tienda_core::{CoreError, StorageError};

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

// =============================================================================
// Fetch Error
// =============================================================================

/// Why a single fetch (after retries) failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response within the timeout.
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// A response arrived with a status outside 2xx.
    #[error("HTTP error! status: {status}")]
    Http { status: u16, body: String },

    /// Connection-level failure: DNS, refused, reset, unreachable.
    #[error("Connection failed: {0}")]
    Transport(String),

    /// The caller cancelled the request.
    #[error("Request cancelled")]
    Cancelled,

    /// A 2xx body that does not decode into the expected type.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The request body could not be serialized; nothing was sent.
    #[error("Could not encode request body: {0}")]
    Encode(String),
}

/// Coarse classification of a `FetchError`, for callers that only branch
/// on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Timeout,
    Http,
    Transport,
    Cancelled,
    Decode,
    Encode,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Timeout { .. } => FetchErrorKind::Timeout,
            FetchError::Http { .. } => FetchErrorKind::Http,
            FetchError::Transport(_) => FetchErrorKind::Transport,
            FetchError::Cancelled => FetchErrorKind::Cancelled,
            FetchError::Decode(_) => FetchErrorKind::Decode,
            FetchError::Encode(_) => FetchErrorKind::Encode,
        }
    }

    /// Returns true if another attempt could succeed.
    ///
    /// ## Retryable
    /// - Timeouts
    /// - Any non-2xx status
    /// - Connection failures
    ///
    /// ## Never Retried
    /// - Cancellation requested by the caller
    /// - Undecodable success bodies (the same bytes would come back)
    /// - Bodies that could not be encoded
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout { .. } | FetchError::Http { .. } | FetchError::Transport(_)
        )
    }

    /// HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// Client Error
// =============================================================================

/// Everything the presentation layer can be handed.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Network
    // =========================================================================
    #[error(transparent)]
    Fetch(#[from] FetchError),

    // =========================================================================
    // Domain
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    // =========================================================================
    // Configuration
    // =========================================================================
    /// Base URL does not parse or is not http(s).
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// A config value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Admin Session
    // =========================================================================
    /// The API rejected the admin username or password.
    #[error("Invalid admin credentials")]
    InvalidCredentials,

    /// An admin call was made without logging in first.
    #[error("Not logged in as admin")]
    NotAuthenticated,
}

/// Machine-readable error code for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Timeout,
    HttpError,
    Unreachable,
    Cancelled,
    BadResponse,
    BadRequest,
    EmptyCart,
    InvalidContact,
    NotFound,
    Storage,
    Config,
    InvalidCredentials,
    NotAuthenticated,
    Internal,
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Fetch(err) => match err.kind() {
                FetchErrorKind::Timeout => ErrorCode::Timeout,
                FetchErrorKind::Http => ErrorCode::HttpError,
                FetchErrorKind::Transport => ErrorCode::Unreachable,
                FetchErrorKind::Cancelled => ErrorCode::Cancelled,
                FetchErrorKind::Decode => ErrorCode::BadResponse,
                FetchErrorKind::Encode => ErrorCode::BadRequest,
            },
            ClientError::Core(CoreError::EmptyCart) => ErrorCode::EmptyCart,
            ClientError::Core(CoreError::InvalidContact(_))
            | ClientError::Core(CoreError::Validation(_)) => ErrorCode::InvalidContact,
            ClientError::Core(CoreError::ProductNotFound(_)) => ErrorCode::NotFound,
            ClientError::Core(_) => ErrorCode::Internal,
            ClientError::Storage(_) => ErrorCode::Storage,
            ClientError::InvalidUrl(_)
            | ClientError::InvalidConfig(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::ConfigSaveFailed(_) => ErrorCode::Config,
            ClientError::InvalidCredentials => ErrorCode::InvalidCredentials,
            ClientError::NotAuthenticated => ErrorCode::NotAuthenticated,
        }
    }

    /// Returns true if the underlying fetch would have been retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Fetch(err) if err.is_retryable())
    }

    /// The message shown to the shopper.
    ///
    /// ## Differentiation
    /// ```text
    /// Timeout        → "The server is taking too long..."
    /// Transport      → "Could not reach the server..."
    /// HTTP 400       → "Some of the order data is not valid..."
    /// anything else  → generic message
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Fetch(FetchError::Timeout { .. }) => {
                "The server is taking too long to respond. Please try again in a moment."
                    .to_string()
            }
            ClientError::Fetch(FetchError::Transport(_)) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ClientError::Fetch(FetchError::Http { status: 400, .. }) => {
                "Some of the order data is not valid. Please review the form.".to_string()
            }
            ClientError::Fetch(FetchError::Cancelled) => "The request was cancelled.".to_string(),
            ClientError::Fetch(FetchError::Encode(_)) => {
                "The request could not be prepared. Nothing was sent.".to_string()
            }
            ClientError::Core(CoreError::EmptyCart) => "Your cart is empty.".to_string(),
            ClientError::Core(CoreError::InvalidContact(errors)) => errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            ClientError::Core(CoreError::ProductNotFound(id)) => {
                format!("Product {} is not in the catalog.", id)
            }
            ClientError::InvalidCredentials => "Incorrect username or password.".to_string(),
            ClientError::NotAuthenticated => {
                "Log in as admin first (storefront admin login).".to_string()
            }
            ClientError::InvalidUrl(_)
            | ClientError::InvalidConfig(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::ConfigSaveFailed(_) => format!("Configuration problem: {}", self),
            _ => "Something went wrong. Please try again later.".to_string(),
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}
