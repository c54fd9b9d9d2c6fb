//! Read model views for the waiter side.

pub mod active_orders;
pub mod cash_register;
pub mod table_board;

pub use active_orders::{ActiveOrderSummary, ActiveOrdersView};
pub use cash_register::{CashRegisterView, MethodTotal, PaymentSummary};
pub use table_board::TableBoardView;

#[cfg(test)]
pub(crate) mod test_support {
    use common::AggregateId;
    use domain::DomainEvent;
    use event_store::{EventEnvelope, Version};

    /// A stored-looking envelope at log `position`.
    pub fn envelope<E: DomainEvent>(
        aggregate_type: &str,
        aggregate_id: AggregateId,
        version: i64,
        position: u64,
        event: &E,
    ) -> EventEnvelope {
        let mut envelope = EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type(aggregate_type)
            .event_type(event.event_type())
            .version(Version::new(version))
            .payload(event)
            .unwrap()
            .build()
            .unwrap();
        envelope.position = position;
        envelope
    }
}
