//! Domain error types.

use common::OrderNumber;
use event_store::EventStoreError;
use thiserror::Error;

use crate::order::OrderError;
use crate::payment::PaymentError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// No order was ever placed with this number.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderNumber),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
