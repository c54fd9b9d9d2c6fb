//! HTTP API for the restaurant: the customer app and the waiter app over one
//! shared in-memory store.
//!
//! Structured logging through `tracing`, Prometheus metrics on `/metrics`.

pub mod config;
pub mod error;
pub mod routes;
pub mod sessions;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::Catalog;
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use sessions::Sessions;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // Menu
        .route("/menu/categories", get(routes::menu::categories))
        .route("/menu/products", get(routes::menu::products::<S>))
        .route("/tables", get(routes::menu::tables::<S>))
        // Customer
        .route("/sessions", post(routes::customer::open_session::<S>))
        .route("/sessions/{id}/cart", get(routes::customer::cart::<S>))
        .route(
            "/sessions/{id}/cart/items",
            post(routes::customer::add_item::<S>),
        )
        .route(
            "/sessions/{id}/cart/items/{product_id}",
            axum::routing::delete(routes::customer::remove_item::<S>),
        )
        .route(
            "/sessions/{id}/orders",
            post(routes::customer::submit_order::<S>),
        )
        .route("/tables/{id}/payments", post(routes::customer::pay::<S>))
        // Waiter
        .route("/orders", get(routes::waiter::list_orders::<S>))
        .route("/orders/{number}", get(routes::waiter::get_order::<S>))
        .route(
            "/orders/{number}/status",
            post(routes::waiter::change_status::<S>),
        )
        .route("/tables/board", get(routes::waiter::table_board::<S>))
        .route("/tables/{id}/settle", post(routes::waiter::settle::<S>))
        .route("/cash-register", get(routes::waiter::cash_register::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Application state over `event_store` with the house menu and default
/// session limits.
pub fn create_default_state<S: EventStore + Clone + 'static>(event_store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(event_store, Catalog::demo(), Sessions::default()))
}
