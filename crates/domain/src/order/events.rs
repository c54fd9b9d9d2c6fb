//! Order domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, OrderNumber, TableId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::cart::CartLine;
use crate::money::Money;
use crate::payment::PaymentMethod;

use super::OrderStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// A cart was sent to the kitchen for a table.
    OrderPlaced(OrderPlacedData),

    /// The waiter moved the order along the service cycle.
    StatusChanged(StatusChangedData),

    /// The order was paid as part of a table settlement and closed.
    OrderSettled(OrderSettledData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "OrderPlaced",
            OrderEvent::StatusChanged(_) => "StatusChanged",
            OrderEvent::OrderSettled(_) => "OrderSettled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedData {
    pub order_id: AggregateId,
    pub number: OrderNumber,
    pub table_id: TableId,
    /// Snapshot of the cart at submission.
    pub lines: Vec<CartLine>,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangedData {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSettledData {
    /// The ledger entry that paid for this order.
    pub payment_id: AggregateId,
    pub method: PaymentMethod,
    /// This order's share of the payment.
    pub amount: Money,
    pub settled_at: DateTime<Utc>,
}

impl OrderEvent {
    pub fn order_placed(
        order_id: AggregateId,
        number: OrderNumber,
        table_id: TableId,
        lines: Vec<CartLine>,
    ) -> Self {
        OrderEvent::OrderPlaced(OrderPlacedData {
            order_id,
            number,
            table_id,
            lines,
            placed_at: Utc::now(),
        })
    }

    pub fn status_changed(from: OrderStatus, to: OrderStatus) -> Self {
        OrderEvent::StatusChanged(StatusChangedData {
            from,
            to,
            changed_at: Utc::now(),
        })
    }

    pub fn order_settled(payment_id: AggregateId, method: PaymentMethod, amount: Money) -> Self {
        OrderEvent::OrderSettled(OrderSettledData {
            payment_id,
            method,
            amount,
            settled_at: Utc::now(),
        })
    }
}
