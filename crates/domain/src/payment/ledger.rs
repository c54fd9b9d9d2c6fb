//! Append-only list of recorded payments.

use common::{AggregateId, OrderNumber, TableId};
use event_store::EventStore;

use crate::aggregate::Aggregate;
use crate::command::{CommandHandler, UnitOfWork};
use crate::error::DomainError;
use crate::money::Money;

use super::{Payment, PaymentEvent, PaymentMethod};

pub struct PaymentLedger<S: EventStore> {
    handler: CommandHandler<S, Payment>,
}

impl<S: EventStore> PaymentLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// Stages a new payment under `payment_id`, to be written together with
    /// the orders it closes.
    ///
    /// The payment is expected not to exist yet; committing fails with a
    /// concurrency conflict if it does.
    pub fn stage_record(
        &self,
        unit: &mut UnitOfWork,
        payment_id: AggregateId,
        table_id: TableId,
        amount: Money,
        method: PaymentMethod,
        orders: Vec<OrderNumber>,
    ) -> Result<(), DomainError> {
        let payment = Payment::default();
        let events = payment.record(payment_id, table_id, amount, method, orders)?;
        unit.stage(payment_id, &payment, &events)
    }

    pub async fn get_payment(&self, payment_id: AggregateId) -> Result<Option<Payment>, DomainError> {
        self.handler.load_existing(payment_id).await
    }

    /// Every payment, newest first.
    pub async fn list_payments(&self) -> Result<Vec<Payment>, DomainError> {
        let envelopes = self
            .handler
            .store()
            .get_events_by_aggregate_type(Payment::aggregate_type())
            .await?;

        let mut payments = Vec::with_capacity(envelopes.len());
        for envelope in envelopes.iter().rev() {
            let mut payment = Payment::default();
            payment.apply(envelope.decode::<PaymentEvent>()?);
            payment.set_version(envelope.version);
            payments.push(payment);
        }
        Ok(payments)
    }

    pub async fn total_collected(&self) -> Result<Money, DomainError> {
        Ok(self
            .list_payments()
            .await?
            .iter()
            .map(Payment::amount)
            .sum())
    }
}
