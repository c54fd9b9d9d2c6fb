//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, OrderNumber, TableId};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::cart::CartLine;
use crate::money::Money;
use crate::payment::PaymentMethod;

use super::{OrderError, OrderEvent, OrderStatus, events::OrderPlacedData};

/// Order aggregate root.
///
/// A submitted cart for one table. The lines never change after placement;
/// only the status moves, and the order is closed by a table settlement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    id: Option<AggregateId>,

    #[serde(default)]
    version: Version,

    number: Option<OrderNumber>,

    table_id: Option<TableId>,

    lines: Vec<CartLine>,

    status: OrderStatus,

    paid: bool,

    payment_method: Option<PaymentMethod>,

    placed_at: Option<DateTime<Utc>>,
}

impl Aggregate for Order {
    type Event = OrderEvent;
    type Error = OrderError;

    fn aggregate_type() -> &'static str {
        "Order"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            OrderEvent::OrderPlaced(data) => self.apply_order_placed(data),
            OrderEvent::StatusChanged(data) => self.status = data.to,
            OrderEvent::OrderSettled(data) => {
                self.status = OrderStatus::Cerrado;
                self.paid = true;
                self.payment_method = Some(data.method);
            }
        }
    }
}

// Query methods
impl Order {
    pub fn number(&self) -> Option<OrderNumber> {
        self.number
    }

    pub fn table_id(&self) -> Option<TableId> {
        self.table_id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_paid(&self) -> bool {
        self.paid
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.placed_at
    }

    /// Σ price × quantity over the order's lines.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// Unpaid and not closed: the order still counts against its table.
    pub fn is_open(&self) -> bool {
        self.id.is_some() && !self.paid && !self.status.is_terminal()
    }
}

// Command methods (return events)
impl Order {
    /// Places a new order from a snapshot of cart lines.
    pub fn place(
        &self,
        order_id: AggregateId,
        number: OrderNumber,
        table_id: TableId,
        lines: Vec<CartLine>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_some() {
            return Err(OrderError::AlreadyPlaced);
        }

        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        Ok(vec![OrderEvent::order_placed(
            order_id, number, table_id, lines,
        )])
    }

    /// Moves the order to `to` if the transition table allows it.
    pub fn change_status(&self, to: OrderStatus) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_none() {
            return Err(OrderError::NotPlaced);
        }

        if !self.status.can_transition_to(to) {
            return Err(OrderError::InvalidStatusTransition {
                from: self.status,
                to,
            });
        }

        Ok(vec![OrderEvent::status_changed(self.status, to)])
    }

    /// Closes the order as paid by `payment_id`.
    pub fn settle(
        &self,
        payment_id: AggregateId,
        method: PaymentMethod,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_none() {
            return Err(OrderError::NotPlaced);
        }

        if !self.is_open() {
            return Err(OrderError::AlreadySettled);
        }

        Ok(vec![OrderEvent::order_settled(
            payment_id,
            method,
            self.subtotal(),
        )])
    }
}

impl Order {
    fn apply_order_placed(&mut self, data: OrderPlacedData) {
        self.id = Some(data.order_id);
        self.number = Some(data.number);
        self.table_id = Some(data.table_id);
        self.lines = data.lines;
        self.status = OrderStatus::EnCocina;
        self.paid = false;
        self.placed_at = Some(data.placed_at);
    }
}
