//! Error types for the order facade and its collaborators.

use common::{ItemId, OrderId};
use thiserror::Error;

/// Error returned by a payment or shipping collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The collaborator handled the request and refused it.
    #[error("{0}")]
    Rejected(String),

    /// The collaborator could not be reached.
    #[error("{0}")]
    Network(String),
}

impl ServiceError {
    /// Returns true for transport faults rather than domain refusals.
    pub fn is_network(&self) -> bool {
        matches!(self, ServiceError::Network(_))
    }
}

/// Errors raised by the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Not enough unlocked stock to satisfy a lock request.
    #[error("Insufficient stock for {item}: requested {requested}, free {free}")]
    InsufficientStock {
        item: ItemId,
        requested: u32,
        free: u32,
    },

    /// Not enough locked stock to unlock or reserve.
    #[error("Insufficient locked quantity for {item}: requested {requested}, locked {locked}")]
    InsufficientLock {
        item: ItemId,
        requested: u32,
        locked: u32,
    },
}

/// Errors that can occur while placing or cancelling an order.
///
/// The display text of each variant is the message stored in the order's
/// status record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The inventory lock could not be taken.
    #[error("{0}")]
    InventoryUnavailable(String),

    /// The payment gateway declined every attempt.
    #[error("{0}")]
    PaymentPlatform(String),

    /// The shipping service refused the shipment.
    #[error("{0}")]
    Shipping(String),

    /// The shipping service refused to cancel a shipment.
    #[error("{0}")]
    ShippingCancellation(String),

    /// The payment gateway refused a refund.
    #[error("{0}")]
    Refund(String),

    /// A collaborator could not be reached.
    #[error("{0}")]
    Network(String),

    /// The order ID has already been used.
    #[error("Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// The order request is malformed.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

impl OrderError {
    /// Returns true if the error is a fault that is surfaced to the caller as
    /// an `Err`, rather than a recognized failure reported as `Ok(false)`.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            OrderError::Network(_) | OrderError::DuplicateOrder(_) | OrderError::InvalidOrder(_)
        )
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::InventoryUnavailable(_) => "inventory_unavailable",
            OrderError::PaymentPlatform(_) => "payment_platform",
            OrderError::Shipping(_) => "shipping",
            OrderError::ShippingCancellation(_) => "shipping_cancellation",
            OrderError::Refund(_) => "refund",
            OrderError::Network(_) => "network",
            OrderError::DuplicateOrder(_) => "duplicate_order",
            OrderError::InvalidOrder(_) => "invalid_order",
        }
    }
}

/// Convenience type alias for facade results.
pub type Result<T> = std::result::Result<T, OrderError>;
