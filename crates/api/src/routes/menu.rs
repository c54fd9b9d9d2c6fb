//! Menu and table listing, shared by both apps.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use domain::{Category, Product, Table};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: Category,
    pub label: &'static str,
}

#[derive(Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// GET /menu/categories: menu tabs in display order.
pub async fn categories() -> Json<Vec<CategoryResponse>> {
    Json(
        Category::ALL
            .into_iter()
            .map(|id| CategoryResponse {
                id,
                label: id.label(),
            })
            .collect(),
    )
}

/// GET /menu/products?category=: products under a tab, featured by default.
#[tracing::instrument(skip(state, query))]
pub async fn products<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let category = match query.category.as_deref() {
        None => Category::Featured,
        Some(raw) => raw.parse::<Category>().map_err(ApiError::NotFound)?,
    };

    Ok(Json(
        state
            .catalog
            .products_in(category)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

/// GET /tables
pub async fn tables<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<Table>> {
    Json(state.catalog.tables().to_vec())
}
