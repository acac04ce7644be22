//! Error types for receiver management and notification dispatch.
//!
//! Every error maps onto an [`ErrorCategory`], which is what the transport
//! layer turns into a status code.

use crate::value::EncodeError;
use thiserror::Error;

/// The coarse classification a caller uses to pick a protocol status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidArgument,
    NotFound,
    Internal,
    Cancelled,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidArgument => "invalid_argument",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Internal => "internal",
            ErrorCategory::Cancelled => "cancelled",
        }
    }
}

/// A receiver configuration that the caller has to fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No value supplied for required configurations map key \"{0}\"")]
    MissingConfigKey(String),

    #[error("receiver not supported")]
    UnsupportedReceiverType(String),
}

/// Failure to turn a Slack target name into a platform id.
///
/// The platform's error text is kept verbatim so operators can tell a missing
/// user apart from an outage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("failed to get id for {email}: {message}")]
    UserLookupFailed { email: String, message: String },

    #[error("app is not part of the channel {0}")]
    NotChannelMember(String),

    #[error("failed to fetch joined channel list: {0}")]
    ChannelListFetchFailed(String),
}

/// Errors raised by a receiver store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("receiver not found")]
    NotFound(u64),

    #[error("{0}")]
    Backend(String),
}

/// Errors returned by the notification dispatcher and the notifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    ReceiverLookupFailed(String),

    #[error("no notifier registered for this receiver")]
    NotifierNotRegistered,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("failed to send message to {target}: {message}")]
    DeliveryFailed { target: String, message: String },

    #[error("notification dispatch cancelled")]
    Cancelled,
}

impl DispatchError {
    pub fn delivery(target: impl Into<String>, message: impl ToString) -> Self {
        DispatchError::DeliveryFailed {
            target: target.into(),
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DispatchError::Validation(_) => ErrorCategory::InvalidArgument,
            DispatchError::ReceiverLookupFailed(_) | DispatchError::NotifierNotRegistered => {
                ErrorCategory::NotFound
            }
            DispatchError::Resolution(_) | DispatchError::DeliveryFailed { .. } => {
                ErrorCategory::Internal
            }
            DispatchError::Cancelled => ErrorCategory::Cancelled,
        }
    }
}

/// Errors returned by the receiver service (create, read, update, delete).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("receiver not found")]
    NotFound(u64),

    #[error("{0}")]
    Store(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("failed to exchange slack auth code: {0}")]
    OAuthExchange(String),

    #[error(transparent)]
    Encoding(#[from] EncodeError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            StoreError::Backend(message) => ServiceError::Store(message),
        }
    }
}

impl ServiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::Validation(_) => ErrorCategory::InvalidArgument,
            ServiceError::NotFound(_) => ErrorCategory::NotFound,
            ServiceError::Store(_)
            | ServiceError::Resolution(_)
            | ServiceError::OAuthExchange(_)
            | ServiceError::Encoding(_) => ErrorCategory::Internal,
        }
    }
}
