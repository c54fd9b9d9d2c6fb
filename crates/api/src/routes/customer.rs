//! Customer app: cart sessions, order submission and paying the table.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{AggregateId, OrderNumber, TableId};
use domain::{Cart, CartLine, Money, Order, OrderStatus, PaymentMethod, ProductId, Settlement};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::{AppState, SessionId};

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: u32,
}

#[derive(Deserialize)]
pub struct SubmitOrderRequest {
    pub table_id: u32,
}

#[derive(Deserialize)]
pub struct PaymentRequest {
    pub method: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
}

#[derive(Serialize)]
pub struct CartLineResponse {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub total: Money,
}

impl From<&CartLine> for CartLineResponse {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            total: line.total(),
        }
    }
}

#[derive(Serialize)]
pub struct CartResponse {
    pub session_id: SessionId,
    pub lines: Vec<CartLineResponse>,
    pub line_count: usize,
    pub total_quantity: u32,
    /// Cents.
    pub subtotal: Money,
    pub subtotal_display: String,
}

impl CartResponse {
    fn new(session_id: SessionId, cart: &Cart) -> Self {
        Self {
            session_id,
            lines: cart.lines().iter().map(CartLineResponse::from).collect(),
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            subtotal_display: cart.subtotal().to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: Option<AggregateId>,
    pub number: Option<OrderNumber>,
    pub table_id: Option<TableId>,
    pub status: OrderStatus,
    pub paid: bool,
    pub payment_method: Option<PaymentMethod>,
    pub lines: Vec<CartLineResponse>,
    pub subtotal: Money,
    pub placed_at: Option<String>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        use domain::Aggregate;

        Self {
            id: order.id(),
            number: order.number(),
            table_id: order.table_id(),
            status: order.status(),
            paid: order.is_paid(),
            payment_method: order.payment_method(),
            lines: order.lines().iter().map(CartLineResponse::from).collect(),
            subtotal: order.subtotal(),
            placed_at: order.placed_at().map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Serialize)]
pub struct SettlementResponse {
    pub payment_id: AggregateId,
    pub table_id: TableId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub orders: Vec<OrderNumber>,
    /// The acknowledgement shown to the customer or waiter.
    pub message: String,
}

impl From<Settlement> for SettlementResponse {
    fn from(settlement: Settlement) -> Self {
        let message = settlement.receipt();
        Self {
            payment_id: settlement.payment_id,
            table_id: settlement.table_id,
            amount: settlement.amount,
            method: settlement.method,
            orders: settlement.orders,
            message,
        }
    }
}

// -- Handlers --

/// POST /sessions: open a new, empty cart.
pub async fn open_session<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> (StatusCode, Json<SessionResponse>) {
    let session_id = state.open_session().await;
    (StatusCode::CREATED, Json(SessionResponse { session_id }))
}

/// GET /sessions/{id}/cart
#[tracing::instrument(skip(state))]
pub async fn cart<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<CartResponse>, ApiError> {
    state
        .sessions
        .with_cart(session_id, |cart| Json(CartResponse::new(session_id, cart)))
        .await
        .ok_or_else(|| unknown_session(session_id))
}

/// POST /sessions/{id}/cart/items: add one unit of a product.
#[tracing::instrument(skip(state, req), fields(product_id = req.product_id))]
pub async fn add_item<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let product = state
        .catalog
        .product(ProductId::new(req.product_id))
        .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", req.product_id)))?;

    state
        .sessions
        .with_cart(session_id, |cart| {
            cart.add(product);
            Json(CartResponse::new(session_id, cart))
        })
        .await
        .ok_or_else(|| unknown_session(session_id))
}

/// DELETE /sessions/{id}/cart/items/{product_id}: remove one unit.
#[tracing::instrument(skip(state))]
pub async fn remove_item<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((session_id, product_id)): Path<(SessionId, u32)>,
) -> Result<Json<CartResponse>, ApiError> {
    state
        .sessions
        .with_cart(session_id, |cart| {
            cart.remove(ProductId::new(product_id));
            Json(CartResponse::new(session_id, cart))
        })
        .await
        .ok_or_else(|| unknown_session(session_id))
}

/// POST /sessions/{id}/orders: send the cart to the kitchen.
#[tracing::instrument(skip(state, req), fields(table_id = req.table_id))]
pub async fn submit_order<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<SubmitOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let table = state.table(req.table_id)?;

    // The session lock is not held across `place_order`.
    let mut snapshot = state
        .sessions
        .with_cart(session_id, |cart| cart.clone())
        .await
        .ok_or_else(|| unknown_session(session_id))?;
    let submitted = snapshot.lines().to_vec();
    let result = state.orders.place_order(&mut snapshot, table.id).await?;
    state.sessions.remove_submitted(session_id, &submitted).await;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse::from(&result.aggregate)),
    ))
}

/// POST /tables/{id}/payments: pay everything the table has open.
#[tracing::instrument(skip(state, req))]
pub async fn pay<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(table_id): Path<u32>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<SettlementResponse>, ApiError> {
    settle_table(&state, table_id, &req.method).await.map(Json)
}

/// Settlement shared by the customer "pay" and the waiter "charge" actions.
pub(crate) async fn settle_table<S: EventStore + Clone + 'static>(
    state: &AppState<S>,
    table_id: u32,
    method: &str,
) -> Result<SettlementResponse, ApiError> {
    let table = state.table(table_id)?;
    let method = method.parse::<PaymentMethod>().map_err(ApiError::BadRequest)?;

    let settlement = state.settlement.settle(table.id, method).await?;
    Ok(SettlementResponse::from(settlement))
}

fn unknown_session(session_id: SessionId) -> ApiError {
    ApiError::NotFound(format!("Session {session_id} not found"))
}
