//! Integration tests for the ordering flow.
//!
//! Cart to order to status changes to settlement, all against one shared
//! event store, plus the stored event log the projections read.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{AggregateId, OrderNumber, TableId};
use domain::{
    Aggregate, Cart, Catalog, DomainError, Money, OrderError, OrderEvent, OrderService,
    OrderStatus, PaymentMethod, ProductId, SettlementError, SettlementService,
};
use event_store::{
    AppendOptions, EventEnvelope, EventStore, EventStoreError, EventStream, InMemoryEventStore,
    Version,
};

struct Restaurant {
    store: InMemoryEventStore,
    catalog: Catalog,
    orders: Arc<OrderService<InMemoryEventStore>>,
    settlement: SettlementService<InMemoryEventStore>,
}

fn restaurant() -> Restaurant {
    let store = InMemoryEventStore::new();
    let orders = Arc::new(OrderService::new(store.clone()));
    let settlement = SettlementService::new(store.clone(), Arc::clone(&orders));
    Restaurant {
        store,
        catalog: Catalog::demo(),
        orders,
        settlement,
    }
}

impl Restaurant {
    fn cart(&self, products: &[u32]) -> Cart {
        let mut cart = Cart::new();
        for id in products {
            cart.add(self.catalog.product(ProductId::new(*id)).unwrap());
        }
        cart
    }

    async fn submit(&self, table: u32, products: &[u32]) -> OrderNumber {
        let mut cart = self.cart(products);
        self.orders
            .place_order(&mut cart, TableId::new(table))
            .await
            .unwrap()
            .aggregate
            .number()
            .unwrap()
    }
}

mod submit {
    use super::*;

    #[tokio::test]
    async fn combo_for_table_three() {
        let r = restaurant();
        let mut cart = r.cart(&[1]);

        let result = r
            .orders
            .place_order(&mut cart, TableId::new(3))
            .await
            .unwrap();

        assert_eq!(result.new_version, Version::first());
        let order = r.orders.get_order(result.aggregate.number().unwrap()).await.unwrap();
        assert_eq!(order.status(), OrderStatus::EnCocina);
        assert!(!order.is_paid());
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.lines()[0].unit_price, Money::from_cents(800));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn empty_cart_records_nothing() {
        let r = restaurant();
        let mut cart = Cart::new();

        let err = r
            .orders
            .place_order(&mut cart, TableId::new(3))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Order(OrderError::EmptyCart)));
        assert!(r.store.get_events_by_type("OrderPlaced").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn order_lines_survive_cart_reuse() {
        let r = restaurant();
        let mut cart = r.cart(&[2, 2, 8]);
        let number = r
            .orders
            .place_order(&mut cart, TableId::new(1))
            .await
            .unwrap()
            .aggregate
            .number()
            .unwrap();

        cart.add(r.catalog.product(ProductId::new(5)).unwrap());

        let order = r.orders.get_order(number).await.unwrap();
        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.subtotal(), Money::from_cents(2 * 350 + 130));
    }
}

mod status {
    use super::*;

    #[tokio::test]
    async fn full_cycle_is_recorded_as_events() {
        let r = restaurant();
        let number = r.submit(4, &[6]).await;

        for next in [OrderStatus::Listo, OrderStatus::Servido, OrderStatus::EnCocina] {
            r.orders.change_status(number, next).await.unwrap();
        }

        let order = r.orders.get_order(number).await.unwrap();
        assert_eq!(order.status(), OrderStatus::EnCocina);
        assert_eq!(order.version(), Version::new(4));

        let events = r
            .store
            .get_events_for_aggregate(order.id().unwrap())
            .await
            .unwrap();
        let types: Vec<_> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(
            types,
            vec!["OrderPlaced", "StatusChanged", "StatusChanged", "StatusChanged"]
        );

        let last: OrderEvent = events[3].decode().unwrap();
        let OrderEvent::StatusChanged(data) = last else {
            panic!("expected StatusChanged");
        };
        assert_eq!(data.from, OrderStatus::Servido);
        assert_eq!(data.to, OrderStatus::EnCocina);
    }

    #[tokio::test]
    async fn rejected_transition_records_nothing() {
        let r = restaurant();
        let number = r.submit(4, &[6]).await;

        let err = r
            .orders
            .change_status(number, OrderStatus::Servido)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Order(OrderError::InvalidStatusTransition {
                from: OrderStatus::EnCocina,
                to: OrderStatus::Servido
            })
        ));

        let order = r.orders.get_order(number).await.unwrap();
        assert_eq!(order.version(), Version::first());
    }
}

mod settlement {
    use super::*;

    #[tokio::test]
    async fn two_orders_on_table_five_paid_in_cash() {
        let r = restaurant();
        let first = r.submit(5, &[1]).await;
        let second = r.submit(5, &[2]).await;

        let settlement = r
            .settlement
            .settle(TableId::new(5), PaymentMethod::Efectivo)
            .await
            .unwrap();

        assert_eq!(settlement.amount, Money::from_cents(1150));
        assert_eq!(settlement.method, PaymentMethod::Efectivo);
        assert_eq!(settlement.orders, vec![first, second]);
        assert_eq!(settlement.receipt(), "Pago registrado: 11,50 € (efectivo)");

        for number in [first, second] {
            let order = r.orders.get_order(number).await.unwrap();
            assert_eq!(order.status(), OrderStatus::Cerrado);
            assert!(order.is_paid());
        }

        let payment = r
            .settlement
            .ledger()
            .get_payment(settlement.payment_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payment.amount(), Money::from_cents(1150));
        assert_eq!(payment.orders(), &[first, second]);
    }

    #[tokio::test]
    async fn resettle_changes_nothing() {
        let r = restaurant();
        r.submit(5, &[1]).await;
        r.settlement
            .settle(TableId::new(5), PaymentMethod::Barra)
            .await
            .unwrap();
        let log_len = r.store.event_count().await;

        let err = r
            .settlement
            .settle(TableId::new(5), PaymentMethod::Barra)
            .await
            .unwrap_err();

        assert!(matches!(err, SettlementError::NothingToSettle { .. }));
        assert_eq!(r.store.event_count().await, log_len);
    }

    #[tokio::test]
    async fn closed_orders_cannot_change_status() {
        let r = restaurant();
        let number = r.submit(8, &[9]).await;
        r.settlement
            .settle(TableId::new(8), PaymentMethod::Online)
            .await
            .unwrap();

        let err = r
            .orders
            .change_status(number, OrderStatus::EnCocina)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Order(OrderError::InvalidStatusTransition {
                from: OrderStatus::Cerrado,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn new_orders_after_settlement_start_a_new_bill() {
        let r = restaurant();
        r.submit(3, &[1]).await;
        r.settlement
            .settle(TableId::new(3), PaymentMethod::Efectivo)
            .await
            .unwrap();

        let later = r.submit(3, &[8]).await;
        let settlement = r
            .settlement
            .settle(TableId::new(3), PaymentMethod::Online)
            .await
            .unwrap();

        assert_eq!(settlement.orders, vec![later]);
        assert_eq!(settlement.amount, Money::from_cents(130));
        assert_eq!(
            r.settlement.ledger().total_collected().await.unwrap(),
            Money::from_cents(930)
        );
    }
}

mod contended_store {
    use super::*;

    /// Shares an in-memory log but can refuse multi-aggregate writes, as if
    /// another writer had moved one of the aggregates on first.
    #[derive(Clone, Default)]
    struct ContendedStore {
        inner: InMemoryEventStore,
        reject_batches: Arc<AtomicBool>,
    }

    #[async_trait]
    impl EventStore for ContendedStore {
        async fn append(
            &self,
            events: Vec<EventEnvelope>,
            options: AppendOptions,
        ) -> event_store::Result<Version> {
            self.inner.append(events, options).await
        }

        async fn append_batches(
            &self,
            batches: Vec<(Vec<EventEnvelope>, AppendOptions)>,
        ) -> event_store::Result<()> {
            if self.reject_batches.load(Ordering::SeqCst) {
                let aggregate_id = batches
                    .last()
                    .and_then(|(events, _)| events.first())
                    .map_or_else(AggregateId::new, |e| e.aggregate_id);
                return Err(EventStoreError::ConcurrencyConflict {
                    aggregate_id,
                    expected: Version::first(),
                    actual: Version::new(2),
                });
            }
            self.inner.append_batches(batches).await
        }

        async fn get_events_for_aggregate(
            &self,
            aggregate_id: AggregateId,
        ) -> event_store::Result<Vec<EventEnvelope>> {
            self.inner.get_events_for_aggregate(aggregate_id).await
        }

        async fn get_events_by_type(&self, event_type: &str) -> event_store::Result<Vec<EventEnvelope>> {
            self.inner.get_events_by_type(event_type).await
        }

        async fn get_events_by_aggregate_type(
            &self,
            aggregate_type: &str,
        ) -> event_store::Result<Vec<EventEnvelope>> {
            self.inner.get_events_by_aggregate_type(aggregate_type).await
        }

        async fn stream_all_events(&self) -> event_store::Result<EventStream> {
            self.inner.stream_all_events().await
        }
    }

    #[tokio::test]
    async fn rejected_settlement_write_leaves_table_unpaid() {
        let store = ContendedStore::default();
        let orders = Arc::new(OrderService::new(store.clone()));
        let settlement = SettlementService::new(store.clone(), Arc::clone(&orders));
        let catalog = Catalog::demo();

        for product in [1, 2] {
            let mut cart = Cart::new();
            cart.add(catalog.product(ProductId::new(product)).unwrap());
            orders.place_order(&mut cart, TableId::new(5)).await.unwrap();
        }
        let log_len = store.inner.event_count().await;

        store.reject_batches.store(true, Ordering::SeqCst);
        let err = settlement
            .settle(TableId::new(5), PaymentMethod::Efectivo)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SettlementError::Domain(DomainError::EventStore(
                EventStoreError::ConcurrencyConflict { .. }
            ))
        ));

        assert_eq!(store.inner.event_count().await, log_len);
        assert!(settlement.ledger().list_payments().await.unwrap().is_empty());
        for order in orders.list_orders().await.unwrap() {
            assert!(!order.is_paid());
            assert_eq!(order.status(), OrderStatus::EnCocina);
        }

        store.reject_batches.store(false, Ordering::SeqCst);
        let retried = settlement
            .settle(TableId::new(5), PaymentMethod::Efectivo)
            .await
            .unwrap();
        assert_eq!(retried.amount, Money::from_cents(1150));
        assert_eq!(settlement.ledger().list_payments().await.unwrap().len(), 1);
    }
}
