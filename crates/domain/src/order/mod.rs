//! Order aggregate and the order lifecycle service.

mod aggregate;
mod events;
mod service;
mod state;

pub use aggregate::Order;
pub use events::{OrderEvent, OrderPlacedData, OrderSettledData, StatusChangedData};
pub use service::OrderService;
pub use state::OrderStatus;

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Submitting a cart with no lines.
    #[error("Cannot place an order from an empty cart")]
    EmptyCart,

    /// The requested move is not in the status transition table.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order is already settled")]
    AlreadySettled,

    #[error("Order already placed")]
    AlreadyPlaced,

    /// A command other than placement ran against an order with no events.
    #[error("Order has not been placed")]
    NotPlaced,
}
