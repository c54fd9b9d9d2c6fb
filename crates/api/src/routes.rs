//! HTTP route handlers.

pub mod customer;
pub mod health;
pub mod menu;
pub mod metrics;
pub mod waiter;
