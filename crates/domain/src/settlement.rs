//! Charging a table: closes its open orders and records one payment.

use std::sync::Arc;

use common::{AggregateId, OrderNumber, TableId};
use event_store::EventStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::Aggregate;
use crate::command::UnitOfWork;
use crate::error::DomainError;
use crate::money::Money;
use crate::order::{OrderError, OrderService};
use crate::payment::{PaymentLedger, PaymentMethod};

#[derive(Debug, Error)]
pub enum SettlementError {
    /// The table has no unpaid, open orders.
    #[error("Nothing to settle for table {table_id}")]
    NothingToSettle { table_id: TableId },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Outcome of a successful settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub payment_id: AggregateId,
    pub table_id: TableId,
    pub amount: Money,
    pub method: PaymentMethod,
    /// Orders closed by this payment, oldest first.
    pub orders: Vec<OrderNumber>,
}

impl Settlement {
    /// The acknowledgement shown to whoever paid.
    pub fn receipt(&self) -> String {
        format!("Pago registrado: {} ({})", self.amount, self.method)
    }
}

/// Settles tables against the shared order store and payment ledger.
///
/// The customer "pay" button and the waiter "charge table" button both end up
/// here. A settlement holds the order writer lock while it selects and
/// closes a table's orders, and writes the closed orders and their payment
/// in one append: either all of them are recorded or none is.
pub struct SettlementService<S: EventStore> {
    store: S,
    orders: Arc<OrderService<S>>,
    ledger: PaymentLedger<S>,
}

impl<S: EventStore + Clone> SettlementService<S> {
    pub fn new(store: S, orders: Arc<OrderService<S>>) -> Self {
        Self {
            ledger: PaymentLedger::new(store.clone()),
            store,
            orders,
        }
    }

    pub fn ledger(&self) -> &PaymentLedger<S> {
        &self.ledger
    }

    /// Charges `table_id` for all of its open orders with `method`.
    #[tracing::instrument(skip(self))]
    pub async fn settle(
        &self,
        table_id: TableId,
        method: PaymentMethod,
    ) -> Result<Settlement, SettlementError> {
        let _writes = self.orders.lock_writes().await;

        let mut open = self.orders.open_orders_for_table(table_id).await?;
        if open.is_empty() {
            tracing::warn!(table = %table_id, "settlement requested with no open orders");
            return Err(SettlementError::NothingToSettle { table_id });
        }
        open.reverse();

        let amount: Money = open.iter().map(|order| order.subtotal()).sum();
        let numbers: Vec<OrderNumber> = open.iter().filter_map(|order| order.number()).collect();
        let payment_id = AggregateId::new();

        let mut unit = UnitOfWork::new();
        for order in &open {
            let order_id = order
                .id()
                .ok_or(DomainError::Order(OrderError::NotPlaced))?;
            let events = order
                .settle(payment_id, method)
                .map_err(DomainError::from)?;
            unit.stage(order_id, order, &events)?;
        }
        self.ledger.stage_record(
            &mut unit,
            payment_id,
            table_id,
            amount,
            method,
            numbers.clone(),
        )?;
        unit.commit(&self.store).await?;

        metrics::counter!("settlements_total", "method" => method.as_str()).increment(1);
        metrics::counter!("settlement_amount_cents").increment(amount.cents().unsigned_abs());
        tracing::info!(
            table = %table_id,
            %amount,
            %method,
            orders = numbers.len(),
            "table settled"
        );

        Ok(Settlement {
            payment_id,
            table_id,
            amount,
            method,
            orders: numbers,
        })
    }
}
