//! Waiter app: order board, status changes, charging tables, cash register.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{OrderNumber, TableId};
use domain::{Money, OrderStatus};
use event_store::EventStore;
use projections::{ActiveOrderSummary, MethodTotal, PaymentSummary};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::customer::{OrderResponse, SettlementResponse, settle_table};
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct OrdersQuery {
    pub table: Option<u32>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct SettleRequest {
    pub method: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct TableBoardEntry {
    pub table_id: TableId,
    pub name: String,
    pub open_orders: usize,
    /// Oldest first.
    pub order_numbers: Vec<OrderNumber>,
}

#[derive(Serialize)]
pub struct CashRegisterResponse {
    /// Cents.
    pub total_collected: Money,
    pub total_display: String,
    pub by_method: Vec<MethodTotal>,
    pub payments: Vec<PaymentSummary>,
}

// -- Handlers --

/// GET /orders?table=&status=: orders not yet closed, newest first.
#[tracing::instrument(skip(state, query), fields(table = query.table))]
pub async fn list_orders<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<ActiveOrderSummary>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    state.refresh_views().await?;

    let mut orders = match (query.table, status) {
        (Some(id), _) => {
            let table = state.table(id)?;
            state.active_orders.for_table(table.id).await
        }
        (None, Some(status)) => state.active_orders.with_status(status).await,
        (None, None) => state.active_orders.all().await,
    };
    if let Some(status) = status {
        orders.retain(|o| o.status == status);
    }

    Ok(Json(orders))
}

/// GET /orders/{number}: one order in any status, read from the log.
#[tracing::instrument(skip(state))]
pub async fn get_order<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(number): Path<u64>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.get_order(OrderNumber::new(number)).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/{number}/status: move the order along the service cycle.
#[tracing::instrument(skip(state, req), fields(status = %req.status))]
pub async fn change_status<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(number): Path<u64>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let status = req
        .status
        .parse::<OrderStatus>()
        .map_err(ApiError::BadRequest)?;

    let result = state
        .orders
        .change_status(OrderNumber::new(number), status)
        .await?;

    Ok(Json(OrderResponse::from(&result.aggregate)))
}

/// GET /tables/board: open order count for every table.
pub async fn table_board<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<TableBoardEntry>>, ApiError> {
    state.refresh_views().await?;

    let mut board = Vec::with_capacity(state.catalog.tables().len());
    for table in state.catalog.tables() {
        let order_numbers = state.table_board.open_orders(table.id).await;
        board.push(TableBoardEntry {
            table_id: table.id,
            name: table.name.clone(),
            open_orders: order_numbers.len(),
            order_numbers,
        });
    }

    Ok(Json(board))
}

/// POST /tables/{id}/settle: charge the table.
#[tracing::instrument(skip(state, req))]
pub async fn settle<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(table_id): Path<u32>,
    Json(req): Json<SettleRequest>,
) -> Result<Json<SettlementResponse>, ApiError> {
    settle_table(&state, table_id, &req.method).await.map(Json)
}

/// GET /cash-register: today's takings.
pub async fn cash_register<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<CashRegisterResponse>, ApiError> {
    state.refresh_views().await?;

    let total = state.cash_register.total_collected().await;
    Ok(Json(CashRegisterResponse {
        total_collected: total,
        total_display: total.to_string(),
        by_method: state.cash_register.totals_by_method().await,
        payments: state.cash_register.payments().await,
    }))
}
