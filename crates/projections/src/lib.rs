//! Read models for the waiter side of the restaurant.
//!
//! - [`Projection`] trait for folding stored events into read models
//! - [`ProjectionProcessor`] for feeding events from the store to projections
//! - Three views: table board, active orders, cash register

pub mod error;
pub mod processor;
pub mod projection;
pub mod views;

pub use error::{ProjectionError, Result};
pub use processor::ProjectionProcessor;
pub use projection::{Projection, ProjectionPosition};
pub use views::{
    ActiveOrderSummary, ActiveOrdersView, CashRegisterView, MethodTotal, PaymentSummary,
    TableBoardView,
};
