//! Order service: placing orders and moving them through the service cycle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use common::{AggregateId, OrderNumber, TableId};
use event_store::{EventEnvelope, EventStore};
use tokio::sync::{Mutex, MutexGuard};

use crate::aggregate::Aggregate;
use crate::cart::Cart;
use crate::command::{CommandHandler, CommandResult, replay};
use crate::error::DomainError;

use super::{Order, OrderError, OrderEvent, OrderStatus};

/// Service for managing orders.
///
/// Wraps the command handler and hands out order numbers. Numbers come from
/// one counter shared by every table, so they are unique and strictly
/// increasing across the whole dining room.
///
/// Every write to an order happens under one writer lock. Settlement holds
/// the same lock from selecting a table's orders until its events land.
pub struct OrderService<S: EventStore> {
    handler: CommandHandler<S, Order>,
    next_number: AtomicU64,
    writer: Mutex<()>,
}

impl<S: EventStore> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
            next_number: AtomicU64::new(OrderNumber::first().as_u64()),
            writer: Mutex::new(()),
        }
    }

    /// Takes the order writer lock.
    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    /// Submits the cart as a new order for `table_id`.
    ///
    /// The cart is cleared only once the order is recorded. An empty cart is
    /// rejected and left as it is.
    #[tracing::instrument(skip(self, cart), fields(lines = cart.line_count()))]
    pub async fn place_order(
        &self,
        cart: &mut Cart,
        table_id: TableId,
    ) -> Result<CommandResult<Order>, DomainError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }

        let _writes = self.lock_writes().await;
        let order_id = AggregateId::new();
        let number = OrderNumber::new(self.next_number.fetch_add(1, Ordering::SeqCst));
        let lines = cart.lines().to_vec();

        let result = self
            .handler
            .execute(order_id, |order| {
                order.place(order_id, number, table_id, lines)
            })
            .await?;

        cart.clear();

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(
            order = %number,
            table = %table_id,
            subtotal = %result.aggregate.subtotal(),
            "order placed"
        );

        Ok(result)
    }

    /// Moves an order one step along the service cycle.
    #[tracing::instrument(skip(self))]
    pub async fn change_status(
        &self,
        number: OrderNumber,
        to: OrderStatus,
    ) -> Result<CommandResult<Order>, DomainError> {
        let order_id = self.find_id(number).await?;

        let _writes = self.lock_writes().await;
        let result = self
            .handler
            .execute(order_id, |order| order.change_status(to))
            .await?;

        metrics::counter!("order_status_changes_total", "to" => to.as_str()).increment(1);
        tracing::info!(order = %number, status = %to, "order status changed");

        Ok(result)
    }

    /// Loads an order by number, whatever its status.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, number: OrderNumber) -> Result<Order, DomainError> {
        let order_id = self.find_id(number).await?;
        self.handler
            .load_existing(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(number))
    }

    /// Every order ever placed, newest first.
    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        let envelopes = self
            .handler
            .store()
            .get_events_by_aggregate_type(Order::aggregate_type())
            .await?;

        let mut order_ids = Vec::new();
        let mut streams: HashMap<AggregateId, Vec<EventEnvelope>> = HashMap::new();
        for envelope in envelopes {
            let stream = streams.entry(envelope.aggregate_id).or_default();
            if stream.is_empty() {
                order_ids.push(envelope.aggregate_id);
            }
            stream.push(envelope);
        }

        let mut orders = Vec::with_capacity(order_ids.len());
        for order_id in order_ids {
            if let Some(stream) = streams.remove(&order_id) {
                orders.push(replay::<Order>(stream)?);
            }
        }

        orders.sort_by(|a, b| b.number().cmp(&a.number()));
        Ok(orders)
    }

    /// The table's unpaid, not closed orders, newest first.
    pub async fn open_orders_for_table(&self, table_id: TableId) -> Result<Vec<Order>, DomainError> {
        let orders = self.list_orders().await?;
        Ok(orders
            .into_iter()
            .filter(|order| order.is_open() && order.table_id() == Some(table_id))
            .collect())
    }

    async fn find_id(&self, number: OrderNumber) -> Result<AggregateId, DomainError> {
        let placed = self
            .handler
            .store()
            .get_events_by_type("OrderPlaced")
            .await?;

        for envelope in placed {
            if let OrderEvent::OrderPlaced(data) = envelope.decode::<OrderEvent>()? {
                if data.number == number {
                    return Ok(data.order_id);
                }
            }
        }

        Err(DomainError::OrderNotFound(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, ProductId};
    use crate::money::Money;
    use event_store::InMemoryEventStore;

    fn cart_with(ids: &[u32]) -> Cart {
        let catalog = Catalog::demo();
        let mut cart = Cart::new();
        for id in ids {
            cart.add(catalog.product(ProductId::new(*id)).unwrap());
        }
        cart
    }

    #[tokio::test]
    async fn test_place_order_clears_cart() {
        let service = OrderService::new(InMemoryEventStore::new());
        let mut cart = cart_with(&[1]);

        let result = service.place_order(&mut cart, TableId::new(3)).await.unwrap();

        let order = result.aggregate;
        assert_eq!(order.number(), Some(OrderNumber::first()));
        assert_eq!(order.table_id(), Some(TableId::new(3)));
        assert_eq!(order.status(), OrderStatus::EnCocina);
        assert!(!order.is_paid());
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.lines()[0].name, "Combo Pareja");
        assert_eq!(order.subtotal(), Money::from_cents(800));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_changes_nothing() {
        let service = OrderService::new(InMemoryEventStore::new());
        let mut cart = Cart::new();

        let result = service.place_order(&mut cart, TableId::new(3)).await;

        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::EmptyCart))
        ));
        assert!(service.list_orders().await.unwrap().is_empty());

        // The failed attempt does not burn a number.
        let mut cart = cart_with(&[8]);
        let order = service
            .place_order(&mut cart, TableId::new(3))
            .await
            .unwrap()
            .aggregate;
        assert_eq!(order.number(), Some(OrderNumber::first()));
    }

    #[tokio::test]
    async fn test_numbers_increase_across_tables() {
        let service = OrderService::new(InMemoryEventStore::new());

        let mut numbers = Vec::new();
        for table in [4, 1, 4, 9] {
            let mut cart = cart_with(&[7]);
            let order = service
                .place_order(&mut cart, TableId::new(table))
                .await
                .unwrap()
                .aggregate;
            numbers.push(order.number().unwrap());
        }

        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(numbers.last(), Some(&OrderNumber::new(4)));
    }

    #[tokio::test]
    async fn test_change_status_by_number() {
        let service = OrderService::new(InMemoryEventStore::new());
        let mut cart = cart_with(&[2]);
        service.place_order(&mut cart, TableId::new(2)).await.unwrap();

        let number = OrderNumber::first();
        service.change_status(number, OrderStatus::Listo).await.unwrap();
        service.change_status(number, OrderStatus::Servido).await.unwrap();

        let order = service.get_order(number).await.unwrap();
        assert_eq!(order.status(), OrderStatus::Servido);

        let illegal = service.change_status(number, OrderStatus::Cerrado).await;
        assert!(matches!(
            illegal,
            Err(DomainError::Order(OrderError::InvalidStatusTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unknown_number_not_found() {
        let service = OrderService::new(InMemoryEventStore::new());

        assert!(matches!(
            service.get_order(OrderNumber::new(42)).await,
            Err(DomainError::OrderNotFound(_))
        ));
        assert!(matches!(
            service
                .change_status(OrderNumber::new(42), OrderStatus::Listo)
                .await,
            Err(DomainError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_open_by_table() {
        let service = OrderService::new(InMemoryEventStore::new());
        for table in [5, 6, 5] {
            let mut cart = cart_with(&[3]);
            service
                .place_order(&mut cart, TableId::new(table))
                .await
                .unwrap();
        }

        let numbers: Vec<_> = service
            .list_orders()
            .await
            .unwrap()
            .iter()
            .filter_map(Order::number)
            .map(|n| n.as_u64())
            .collect();
        assert_eq!(numbers, vec![3, 2, 1]);

        let table_five = service
            .open_orders_for_table(TableId::new(5))
            .await
            .unwrap();
        assert_eq!(table_five.len(), 2);
        assert!(
            table_five
                .iter()
                .all(|o| o.table_id() == Some(TableId::new(5)))
        );
    }
}
