//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, OrderError, PaymentError, SettlementError};
use event_store::EventStoreError;
use projections::ProjectionError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Domain(DomainError),
    Settlement(SettlementError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Settlement(SettlementError::Domain(err)) => domain_error_to_response(err),
            ApiError::Settlement(err @ SettlementError::NothingToSettle { .. }) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match &err {
        DomainError::Order(OrderError::EmptyCart) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Order(
            OrderError::InvalidStatusTransition { .. }
            | OrderError::AlreadySettled
            | OrderError::AlreadyPlaced
            | OrderError::NotPlaced,
        ) => StatusCode::CONFLICT,
        DomainError::Payment(PaymentError::NonPositiveAmount { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DomainError::Payment(PaymentError::AlreadyRecorded) => StatusCode::CONFLICT,
        DomainError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. }) => {
            StatusCode::CONFLICT
        }
        DomainError::EventStore(_) | DomainError::Serialization(_) => {
            tracing::error!(error = %err, "domain failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        ApiError::Settlement(err)
    }
}

impl From<ProjectionError> for ApiError {
    fn from(err: ProjectionError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{OrderNumber, TableId};
    use domain::OrderStatus;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn empty_cart_is_unprocessable() {
        let err = ApiError::from(DomainError::from(OrderError::EmptyCart));
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn illegal_transition_conflicts() {
        let err = ApiError::from(DomainError::from(OrderError::InvalidStatusTransition {
            from: OrderStatus::EnCocina,
            to: OrderStatus::Cerrado,
        }));
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn nothing_to_settle_conflicts() {
        let err = ApiError::from(SettlementError::NothingToSettle {
            table_id: TableId::new(4),
        });
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn unknown_order_not_found() {
        let err = ApiError::from(DomainError::OrderNotFound(OrderNumber::new(9)));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }
}
