//! Payment ledger: one event-sourced entry per settlement.

mod aggregate;
mod events;
mod ledger;
mod method;

pub use aggregate::Payment;
pub use events::{PaymentEvent, PaymentRecordedData};
pub use ledger::PaymentLedger;
pub use method::PaymentMethod;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment already recorded")]
    AlreadyRecorded,

    #[error("Payment amount must be positive, got {cents} cents")]
    NonPositiveAmount { cents: i64 },
}
