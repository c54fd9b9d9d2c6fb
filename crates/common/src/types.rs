use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an event-sourced aggregate (an order or a payment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(Uuid);

impl AggregateId {
    /// Creates a new random aggregate ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dining table, numbered from 1 as printed on the table card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(u32);

impl TableId {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TableId {
    fn from(number: u32) -> Self {
        Self(number)
    }
}

/// Human-facing order number, handed out sequentially starting at 1.
///
/// This is what the kitchen ticket and the waiter board show; the order's
/// event stream is keyed by its [`AggregateId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(u64);

impl OrderNumber {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The number given to the first order of the day.
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for OrderNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_id_new_creates_unique_ids() {
        let id1 = AggregateId::new();
        let id2 = AggregateId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn table_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&TableId::new(7)).unwrap();
        assert_eq!(json, "7");
        let table: TableId = serde_json::from_str("12").unwrap();
        assert_eq!(table.as_u32(), 12);
    }

    #[test]
    fn order_numbers_count_up_from_one() {
        let first = OrderNumber::first();
        assert_eq!(first.as_u64(), 1);
        assert!(first.next() > first);
        assert_eq!(first.next().as_u64(), 2);
    }

    #[test]
    fn order_number_display_uses_ticket_format() {
        assert_eq!(OrderNumber::new(42).to_string(), "#42");
    }
}
