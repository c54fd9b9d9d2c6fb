//! Shared state behind both the customer and the waiter endpoints.

use std::sync::Arc;

use common::TableId;
use domain::{Catalog, OrderService, SettlementService, Table};
use event_store::EventStore;
use projections::{
    ActiveOrdersView, CashRegisterView, Projection, ProjectionProcessor, TableBoardView,
};

use crate::error::ApiError;
use crate::sessions::Sessions;

pub use crate::sessions::SessionId;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub catalog: Catalog,
    pub orders: Arc<OrderService<S>>,
    pub settlement: SettlementService<S>,
    pub sessions: Sessions,
    pub processor: ProjectionProcessor<S>,
    pub table_board: TableBoardView,
    pub active_orders: ActiveOrdersView,
    pub cash_register: CashRegisterView,
}

impl<S: EventStore + Clone + 'static> AppState<S> {
    /// Wires the services and read models around one event store.
    pub fn new(event_store: S, catalog: Catalog, sessions: Sessions) -> Self {
        let orders = Arc::new(OrderService::new(event_store.clone()));
        let settlement = SettlementService::new(event_store.clone(), Arc::clone(&orders));

        let table_board = TableBoardView::new();
        let active_orders = ActiveOrdersView::new();
        let cash_register = CashRegisterView::new();

        let mut processor = ProjectionProcessor::new(event_store);
        processor.register(Box::new(table_board.clone()) as Box<dyn Projection>);
        processor.register(Box::new(active_orders.clone()));
        processor.register(Box::new(cash_register.clone()));

        Self {
            catalog,
            orders,
            settlement,
            sessions,
            processor,
            table_board,
            active_orders,
            cash_register,
        }
    }

    /// Brings the read models up to date with the log.
    pub async fn refresh_views(&self) -> Result<(), ApiError> {
        self.processor.run_catch_up().await?;
        Ok(())
    }

    pub fn table(&self, id: u32) -> Result<&Table, ApiError> {
        self.catalog
            .table(TableId::new(id))
            .ok_or_else(|| ApiError::NotFound(format!("Table {id} not found")))
    }

    pub async fn open_session(&self) -> SessionId {
        let id = self.sessions.open().await;
        metrics::counter!("sessions_opened_total").increment(1);
        tracing::info!(session = %id, "session opened");
        id
    }
}
