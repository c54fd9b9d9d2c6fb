//! Domain layer of the restaurant ordering system.
//!
//! - [`Cart`]: the customer's unsubmitted selection
//! - [`Order`]: event-sourced order with the kitchen/service state machine
//! - [`Payment`]: event-sourced entry of the payment ledger
//! - [`SettlementService`]: closes a table's open orders and records one payment
//! - [`Catalog`]: the static menu and table fixtures

pub mod aggregate;
pub mod cart;
pub mod catalog;
pub mod command;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod settlement;

pub use aggregate::{Aggregate, DomainEvent};
pub use cart::{Cart, CartLine};
pub use catalog::{Catalog, Category, Product, ProductId, Table};
pub use command::{CommandHandler, CommandResult, UnitOfWork};
pub use error::DomainError;
pub use money::Money;
pub use order::{Order, OrderError, OrderEvent, OrderService, OrderStatus};
pub use payment::{Payment, PaymentError, PaymentEvent, PaymentLedger, PaymentMethod};
pub use settlement::{Settlement, SettlementError, SettlementService};
