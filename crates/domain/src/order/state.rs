//! Order status state machine.

use serde::{Deserialize, Serialize};

/// Where an order is in the kitchen/service cycle.
///
/// ```text
///           ┌──────────────────────────────┐
///           ▼                              │
///   EnCocina ──► Listo ──► Servido ────────┘
///       │          │          │
///       └──────────┴──────────┴──► Cerrado   (settlement only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Sent to the kitchen.
    #[default]
    EnCocina,

    /// Cooked, waiting to be carried to the table.
    Listo,

    /// On the table. Can go back to the kitchen for rework.
    Servido,

    /// Paid and closed (terminal).
    Cerrado,
}

impl OrderStatus {
    /// The transition the waiter is offered from this status, if any.
    pub fn next_in_service(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::EnCocina => Some(OrderStatus::Listo),
            OrderStatus::Listo => Some(OrderStatus::Servido),
            OrderStatus::Servido => Some(OrderStatus::EnCocina),
            OrderStatus::Cerrado => None,
        }
    }

    /// Whether a waiter may move an order from this status to `next`.
    ///
    /// Closing is not a status change; it happens only through settlement.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.next_in_service() == Some(next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cerrado)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::EnCocina => "en_cocina",
            OrderStatus::Listo => "listo",
            OrderStatus::Servido => "servido",
            OrderStatus::Cerrado => "cerrado",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en_cocina" => Ok(OrderStatus::EnCocina),
            "listo" => Ok(OrderStatus::Listo),
            "servido" => Ok(OrderStatus::Servido),
            "cerrado" => Ok(OrderStatus::Cerrado),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}
