//! Payment aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, OrderNumber, TableId};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::money::Money;

use super::{PaymentError, PaymentEvent, PaymentMethod};

/// One entry of the payment ledger. Written once, never changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payment {
    id: Option<AggregateId>,

    #[serde(default)]
    version: Version,

    table_id: Option<TableId>,

    amount: Money,

    method: Option<PaymentMethod>,

    orders: Vec<OrderNumber>,

    recorded_at: Option<DateTime<Utc>>,
}

impl Aggregate for Payment {
    type Event = PaymentEvent;
    type Error = PaymentError;

    fn aggregate_type() -> &'static str {
        "Payment"
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
            PaymentEvent::PaymentRecorded(data) => {
                self.id = Some(data.payment_id);
                self.table_id = Some(data.table_id);
                self.amount = data.amount;
                self.method = Some(data.method);
                self.orders = data.orders;
                self.recorded_at = Some(data.recorded_at);
            }
        }
    }
}

impl Payment {
    pub fn table_id(&self) -> Option<TableId> {
        self.table_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn method(&self) -> Option<PaymentMethod> {
        self.method
    }

    pub fn orders(&self) -> &[OrderNumber] {
        &self.orders
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.recorded_at
    }

    pub fn record(
        &self,
        payment_id: AggregateId,
        table_id: TableId,
        amount: Money,
        method: PaymentMethod,
        orders: Vec<OrderNumber>,
    ) -> Result<Vec<PaymentEvent>, PaymentError> {
        if self.id.is_some() {
            return Err(PaymentError::AlreadyRecorded);
        }

        if !amount.is_positive() {
            return Err(PaymentError::NonPositiveAmount {
                cents: amount.cents(),
            });
        }

        Ok(vec![PaymentEvent::payment_recorded(
            payment_id, table_id, amount, method, orders,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_payment() {
        let mut payment = Payment::default();
        let payment_id = AggregateId::new();
        let events = payment
            .record(
                payment_id,
                TableId::new(5),
                Money::from_cents(1150),
                PaymentMethod::Efectivo,
                vec![OrderNumber::new(1), OrderNumber::new(2)],
            )
            .unwrap();
        payment.apply_events(events);

        assert_eq!(payment.id(), Some(payment_id));
        assert_eq!(payment.table_id(), Some(TableId::new(5)));
        assert_eq!(payment.amount(), Money::from_cents(1150));
        assert_eq!(payment.method(), Some(PaymentMethod::Efectivo));
        assert_eq!(payment.orders().len(), 2);
        assert!(payment.recorded_at().is_some());
    }

    #[test]
    fn test_record_twice_fails() {
        let mut payment = Payment::default();
        let events = payment
            .record(
                AggregateId::new(),
                TableId::new(1),
                Money::from_cents(130),
                PaymentMethod::Barra,
                vec![OrderNumber::first()],
            )
            .unwrap();
        payment.apply_events(events);

        let again = payment.record(
            AggregateId::new(),
            TableId::new(1),
            Money::from_cents(130),
            PaymentMethod::Barra,
            vec![OrderNumber::first()],
        );
        assert!(matches!(again, Err(PaymentError::AlreadyRecorded)));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let result = Payment::default().record(
            AggregateId::new(),
            TableId::new(1),
            Money::zero(),
            PaymentMethod::Online,
            vec![],
        );
        assert!(matches!(
            result,
            Err(PaymentError::NonPositiveAmount { cents: 0 })
        ));
    }
}
