//! Open order count per table.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use common::{AggregateId, OrderNumber, TableId};
use domain::{Aggregate, Order, OrderEvent};
use event_store::EventEnvelope;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};

#[derive(Default)]
struct Board {
    open: BTreeMap<TableId, BTreeSet<OrderNumber>>,
    /// Where each placed order sits, for events that only carry the order id.
    placed: HashMap<AggregateId, (TableId, OrderNumber)>,
}

/// Which tables have unpaid, not closed orders.
#[derive(Clone, Default)]
pub struct TableBoardView {
    board: Arc<RwLock<Board>>,
    position: Arc<RwLock<ProjectionPosition>>,
}

impl TableBoardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open order numbers of a table, oldest first.
    pub async fn open_orders(&self, table_id: TableId) -> Vec<OrderNumber> {
        self.board
            .read()
            .await
            .open
            .get(&table_id)
            .map(|numbers| numbers.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Projection for TableBoardView {
    fn name(&self) -> &'static str {
        "TableBoardView"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        if event.aggregate_type == Order::aggregate_type() {
            let order_event: OrderEvent = event.decode()?;
            let mut board = self.board.write().await;

            match order_event {
                OrderEvent::OrderPlaced(data) => {
                    board
                        .placed
                        .insert(data.order_id, (data.table_id, data.number));
                    board
                        .open
                        .entry(data.table_id)
                        .or_default()
                        .insert(data.number);
                }
                OrderEvent::OrderSettled(_) => {
                    if let Some((table_id, number)) = board.placed.get(&event.aggregate_id).copied()
                    {
                        if let Some(numbers) = board.open.get_mut(&table_id) {
                            numbers.remove(&number);
                        }
                    }
                }
                OrderEvent::StatusChanged(_) => {}
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
        *self.board.write().await = Board::default();
        *self.position.write().await = ProjectionPosition::zero();
        Ok(())
    }
}
