//! # Service Error Type
//!
//! The single error type callers of the fulfilment core receive.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Fulfil                                 │
//! │                                                                         │
//! │  checkout(user, address, payment)                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │  ServiceResult<T>                                                │   │
//! │  │         │                                                        │   │
//! │  │  DbError::InsufficientStock ───────────┐                         │   │
//! │  │  DbError::Busy ────────────────────────┤                         │   │
//! │  │  CoreError::EmptyCart ─────────────────┼──► ServiceError ───────►│   │
//! │  │  CoreError::Forbidden ─────────────────┤    { code, message }    │   │
//! │  │  DbError::QueryFailed (logged, hidden) ┘                         │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  { "code": "INSUFFICIENT_STOCK",                                        │
//! │    "message": "Insufficient stock for product ...: 0 available, ..." }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage messages never leave the process: they are logged with
//! `tracing::error!` and replaced by a generic message.

use serde::Serialize;

use fulfil_core::{CoreError, ValidationError};
use fulfil_db::DbError;

/// Error returned from every service operation.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: 3f1c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed input (400)
    ValidationError,

    /// Unknown product, order or cart line (404)
    NotFound,

    /// Not enough stock for a line (409)
    InsufficientStock,

    /// Checkout with nothing in the cart (400)
    EmptyCart,

    /// Principal lacks the required role or ownership (403)
    AuthorizationError,

    /// Lost a race or timed out waiting for a lock. Retryable.
    Conflict,

    /// Storage failure. Retryable.
    Internal,

    /// Status change the state machine forbids (409)
    InvalidTransition,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::EmptyCart => "EMPTY_CART",
            ErrorCode::AuthorizationError => "AUTHORIZATION_ERROR",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::InvalidTransition => "INVALID_TRANSITION",
        }
    }
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ServiceError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Conflict, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Internal, message)
    }

    /// Only conflicts and internal failures may succeed on a plain retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self.code, ErrorCode::Conflict | ErrorCode::Internal)
    }
}

/// Converts database errors to service errors.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::not_found(&entity, &id),
            DbError::InsufficientStock {
                product_id,
                available,
                requested,
            } => ServiceError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for product {}: {} available, {} requested",
                    product_id, available, requested
                ),
            ),
            DbError::Validation(e) => ServiceError::validation(e.to_string()),
            DbError::UniqueViolation { field, value } => {
                ServiceError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ServiceError::validation("Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ServiceError::internal("Database operation failed")
            }
            DbError::Busy(e) => {
                tracing::warn!("Database busy: {}", e);
                ServiceError::conflict("Database is busy, try again")
            }
            DbError::PoolExhausted => ServiceError::conflict("Database pool exhausted"),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ServiceError::internal("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ServiceError::internal("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ServiceError::internal("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ServiceError::internal("Database transaction failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ServiceError::internal("Database operation failed")
            }
        }
    }
}

/// Converts core errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => ServiceError::new(ErrorCode::EmptyCart, "Cart is empty"),
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => ServiceError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for product {}: {} available, {} requested",
                    product_id, available, requested
                ),
            ),
            CoreError::InvalidStatusTransition { from, to } => ServiceError::new(
                ErrorCode::InvalidTransition,
                format!("Cannot change order status from {} to {}", from, to),
            ),
            CoreError::Forbidden(reason) => {
                ServiceError::new(ErrorCode::AuthorizationError, reason)
            }
            CoreError::ReservationMismatch { product_id } => {
                tracing::error!(product_id = %product_id, "Reservation mismatch during checkout");
                ServiceError::internal("Checkout failed")
            }
            CoreError::AmountOverflow => ServiceError::validation("Order total is out of range"),
            CoreError::Validation(e) => ServiceError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::validation(err.to_string())
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let err = ServiceError::not_found("Order", "o-1");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Order not found: o-1");
        assert_eq!(err.to_string(), "[NOT_FOUND] Order not found: o-1");
    }

    #[test]
    fn test_codes_serialize_like_as_str() {
        for code in [
            ErrorCode::ValidationError,
            ErrorCode::NotFound,
            ErrorCode::InsufficientStock,
            ErrorCode::EmptyCart,
            ErrorCode::AuthorizationError,
            ErrorCode::Conflict,
            ErrorCode::Internal,
            ErrorCode::InvalidTransition,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), code.as_str());
        }
    }

    #[test]
    fn test_retryable_codes() {
        assert!(ServiceError::conflict("x").is_retryable());
        assert!(ServiceError::internal("x").is_retryable());
        assert!(!ServiceError::validation("x").is_retryable());
        assert!(!ServiceError::new(ErrorCode::InsufficientStock, "x").is_retryable());
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ServiceError = DbError::Busy("database is locked".to_string()).into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ServiceError = DbError::QueryFailed("syntax error near SELEC".to_string()).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert!(!err.message.contains("SELEC"));

        let err: ServiceError = DbError::InsufficientStock {
            product_id: "p".to_string(),
            available: 0,
            requested: 1,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[test]
    fn test_core_error_mapping() {
        let err: ServiceError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::EmptyCart);

        let err: ServiceError = CoreError::Forbidden("nope".to_string()).into();
        assert_eq!(err.code, ErrorCode::AuthorizationError);

        let err: ServiceError = CoreError::InvalidStatusTransition {
            from: "pending".to_string(),
            to: "shipped".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }
}
