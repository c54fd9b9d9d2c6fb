//! Active orders read model: everything the kitchen and floor still work on.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AggregateId, OrderNumber, TableId};
use domain::{Aggregate, CartLine, Money, Order, OrderEvent, OrderStatus};
use event_store::EventEnvelope;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};

/// One not yet closed order as the waiter board shows it.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveOrderSummary {
    pub order_id: AggregateId,
    pub number: OrderNumber,
    pub table_id: TableId,
    pub status: OrderStatus,
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Orders that are not `cerrado`. Settlement removes them.
#[derive(Clone, Default)]
pub struct ActiveOrdersView {
    orders: Arc<RwLock<HashMap<AggregateId, ActiveOrderSummary>>>,
    position: Arc<RwLock<ProjectionPosition>>,
}

impl ActiveOrdersView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_order(&self, number: OrderNumber) -> Option<ActiveOrderSummary> {
        self.orders
            .read()
            .await
            .values()
            .find(|o| o.number == number)
            .cloned()
    }

    /// All active orders, newest first.
    pub async fn all(&self) -> Vec<ActiveOrderSummary> {
        let mut orders: Vec<_> = self.orders.read().await.values().cloned().collect();
        orders.sort_by(|a, b| b.number.cmp(&a.number));
        orders
    }

    /// Active orders of one table, newest first.
    pub async fn for_table(&self, table_id: TableId) -> Vec<ActiveOrderSummary> {
        let mut orders = self.all().await;
        orders.retain(|o| o.table_id == table_id);
        orders
    }

    pub async fn with_status(&self, status: OrderStatus) -> Vec<ActiveOrderSummary> {
        let mut orders = self.all().await;
        orders.retain(|o| o.status == status);
        orders
    }
}

#[async_trait]
impl Projection for ActiveOrdersView {
    fn name(&self) -> &'static str {
        "ActiveOrdersView"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        if event.aggregate_type == Order::aggregate_type() {
            let order_event: OrderEvent = event.decode()?;
            let order_id = event.aggregate_id;
            let mut orders = self.orders.write().await;

            match order_event {
                OrderEvent::OrderPlaced(data) => {
                    let subtotal: Money = data.lines.iter().map(CartLine::total).sum();
                    orders.insert(
                        order_id,
                        ActiveOrderSummary {
                            order_id,
                            number: data.number,
                            table_id: data.table_id,
                            status: OrderStatus::EnCocina,
                            lines: data.lines,
                            subtotal,
                            placed_at: data.placed_at,
                            updated_at: data.placed_at,
                        },
                    );
                }
                OrderEvent::StatusChanged(data) => {
                    if let Some(order) = orders.get_mut(&order_id) {
                        order.status = data.to;
                        order.updated_at = data.changed_at;
                    }
                }
                OrderEvent::OrderSettled(_) => {
                    orders.remove(&order_id);
                }
            }
        }

        let mut pos = self.position.write().await;
        *pos = pos.advance_to(event.position);

        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        *self.position.read().await
    }

    async fn reset(&self) -> Result<()> {
        self.orders.write().await.clear();
        *self.position.write().await = ProjectionPosition::zero();
        Ok(())
    }
}
