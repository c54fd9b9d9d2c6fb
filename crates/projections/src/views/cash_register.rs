//! Today's cash register: every payment and the totals per method.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AggregateId, OrderNumber, TableId};
use domain::{Aggregate, Money, Payment, PaymentEvent, PaymentMethod};
use event_store::EventEnvelope;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};

/// Smallest scale the method bars are drawn against.
const MIN_BAR_SCALE: Money = Money::from_cents(100);

#[derive(Debug, Clone, Serialize)]
pub struct PaymentSummary {
    pub payment_id: AggregateId,
    pub table_id: TableId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub orders: Vec<OrderNumber>,
    pub recorded_at: DateTime<Utc>,
}

/// Collected amount for one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub total: Money,
    /// Bar height for the register chart, 0 to 100.
    pub bar_percent: u8,
}

#[derive(Clone, Default)]
pub struct CashRegisterView {
    payments: Arc<RwLock<Vec<PaymentSummary>>>,
    position: Arc<RwLock<ProjectionPosition>>,
}

impl CashRegisterView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every payment, newest first.
    pub async fn payments(&self) -> Vec<PaymentSummary> {
        self.payments.read().await.iter().rev().cloned().collect()
    }

    pub async fn total_collected(&self) -> Money {
        self.payments.read().await.iter().map(|p| p.amount).sum()
    }

    /// Totals for every method, in register order, including unused ones.
    ///
    /// A method's bar is its total relative to the larger of that total and
    /// the biggest single payment (at least 1 €), rounded to a percentage.
    pub async fn totals_by_method(&self) -> Vec<MethodTotal> {
        let payments = self.payments.read().await;
        let largest = payments
            .iter()
            .map(|p| p.amount)
            .max()
            .unwrap_or_default()
            .max(MIN_BAR_SCALE);

        PaymentMethod::ALL
            .into_iter()
            .map(|method| {
                let total: Money = payments
                    .iter()
                    .filter(|p| p.method == method)
                    .map(|p| p.amount)
                    .sum();
                MethodTotal {
                    method,
                    total,
                    bar_percent: bar_percent(total, largest),
                }
            })
            .collect()
    }
}

fn bar_percent(total: Money, largest: Money) -> u8 {
    let scale = total.max(largest).cents();
    if scale <= 0 || total.cents() <= 0 {
        return 0;
    }
    let percent = (total.cents() * 100 + scale / 2) / scale;
    u8::try_from(percent.min(100)).unwrap_or(100)
}

#[async_trait]
impl Projection for CashRegisterView {
    fn name(&self) -> &'static str {
        "CashRegisterView"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        if event.aggregate_type == Payment::aggregate_type() {
            let PaymentEvent::PaymentRecorded(data) = event.decode::<PaymentEvent>()?;
            self.payments.write().await.push(PaymentSummary {
                payment_id: data.payment_id,
                table_id: data.table_id,
                amount: data.amount,
                method: data.method,
                orders: data.orders,
                recorded_at: data.recorded_at,
            });
        }

        let mut pos = self.position.write().await;
        *pos = pos.advance_to(event.position);

        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        *self.position.read().await
    }

    async fn reset(&self) -> Result<()> {
        self.payments.write().await.clear();
        *self.position.write().await = ProjectionPosition::zero();
        Ok(())
    }
}
