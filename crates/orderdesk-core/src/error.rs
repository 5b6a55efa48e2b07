//! Error types for the OrderDesk system.
//!
//! Some outcomes deliberately collapse several root causes into one
//! external signal (`Unauthorized`, `NotCancellable`). The specific cause
//! is kept in a tagged reason for logs and tests; [`OrderDeskError::code`]
//! is what callers outside the core should act on.

use thiserror::Error;
use uuid::Uuid;

use crate::models::order::OrderStatus;

/// Why a token or authenticated subject was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedReason {
    InvalidSignature,
    Expired,
    MissingSubject,
    WrongKind,
    Malformed,
    /// Token was valid but its subject no longer exists.
    UnknownSubject,
}

/// Why a cancel request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelRejection {
    /// No such order for this caller (missing or owned by someone else).
    NotFound,
    NotPending(OrderStatus),
}

/// Coarse outcome class exposed at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    DuplicateEmail,
    InvalidCredentials,
    Unauthorized,
    NotCancellable,
    TransientStoreFailure,
    Internal,
}

#[derive(Debug, Error)]
pub enum OrderDeskError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthorized(UnauthorizedReason),

    #[error("Order not found or cannot be cancelled")]
    NotCancellable(CancelRejection),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Illegal order transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order {id} is no longer {expected}")]
    StatusConflict { id: Uuid, expected: OrderStatus },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrderDeskError {
    pub fn validation(message: impl Into<String>) -> Self {
        OrderDeskError::Validation {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            OrderDeskError::Validation { .. } => ErrorCode::Validation,
            OrderDeskError::DuplicateEmail => ErrorCode::DuplicateEmail,
            OrderDeskError::InvalidCredentials => ErrorCode::InvalidCredentials,
            OrderDeskError::Unauthorized(_) => ErrorCode::Unauthorized,
            OrderDeskError::NotCancellable(_) => ErrorCode::NotCancellable,
            OrderDeskError::Database(_) => ErrorCode::TransientStoreFailure,
            OrderDeskError::NotFound { .. }
            | OrderDeskError::AlreadyExists { .. }
            | OrderDeskError::InvalidTransition { .. }
            | OrderDeskError::StatusConflict { .. }
            | OrderDeskError::Crypto(_)
            | OrderDeskError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn unauthorized_reason(&self) -> Option<UnauthorizedReason> {
        match self {
            OrderDeskError::Unauthorized(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn cancel_rejection(&self) -> Option<CancelRejection> {
        match self {
            OrderDeskError::NotCancellable(rejection) => Some(*rejection),
            _ => None,
        }
    }
}

pub type OrderDeskResult<T> = Result<T, OrderDeskError>;
