//! Payment domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, OrderNumber, TableId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::money::Money;

use super::PaymentMethod;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PaymentEvent {
    /// A table was charged for its open orders.
    PaymentRecorded(PaymentRecordedData),
}

impl DomainEvent for PaymentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::PaymentRecorded(_) => "PaymentRecorded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecordedData {
    pub payment_id: AggregateId,
    pub table_id: TableId,
    pub amount: Money,
    pub method: PaymentMethod,
    /// The orders this payment closed.
    pub orders: Vec<OrderNumber>,
    pub recorded_at: DateTime<Utc>,
}

impl PaymentEvent {
    pub fn payment_recorded(
        payment_id: AggregateId,
        table_id: TableId,
        amount: Money,
        method: PaymentMethod,
        orders: Vec<OrderNumber>,
    ) -> Self {
        PaymentEvent::PaymentRecorded(PaymentRecordedData {
            payment_id,
            table_id,
            amount,
            method,
            orders,
            recorded_at: Utc::now(),
        })
    }
}
