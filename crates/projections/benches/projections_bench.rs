use std::sync::Arc;

use common::TableId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Cart, Catalog, OrderService, OrderStatus, PaymentMethod, SettlementService};
use event_store::InMemoryEventStore;
use projections::{ActiveOrdersView, CashRegisterView, ProjectionProcessor, TableBoardView};

/// Places `n` orders over the twelve tables, moves each one step and settles
/// every fourth table.
async fn populate_store(store: &InMemoryEventStore, n: u32) {
    let catalog = Catalog::demo();
    let orders = Arc::new(OrderService::new(store.clone()));
    let settlement = SettlementService::new(store.clone(), Arc::clone(&orders));

    for i in 0..n {
        let mut cart = Cart::new();
        for product in catalog.products().iter().skip((i % 5) as usize).take(3) {
            cart.add(product);
        }
        let number = orders
            .place_order(&mut cart, TableId::new(i % 12 + 1))
            .await
            .unwrap()
            .aggregate
            .number()
            .unwrap();
        orders.change_status(number, OrderStatus::Listo).await.unwrap();
    }

    for table in (1..=12).step_by(4) {
        settlement
            .settle(TableId::new(table), PaymentMethod::Efectivo)
            .await
            .unwrap();
    }
}

fn processor_with_views(store: &InMemoryEventStore) -> ProjectionProcessor<InMemoryEventStore> {
    let mut processor = ProjectionProcessor::new(store.clone());
    processor.register(Box::new(TableBoardView::new()));
    processor.register(Box::new(ActiveOrdersView::new()));
    processor.register(Box::new(CashRegisterView::new()));
    processor
}

fn bench_catch_up_100_orders(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    rt.block_on(populate_store(&store, 100));

    c.bench_function("projections/catch_up_100_orders", |b| {
        b.iter(|| {
            rt.block_on(async {
                let processor = processor_with_views(&store);
                processor.run_catch_up().await.unwrap();
            });
        });
    });
}

fn bench_incremental_catch_up(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    rt.block_on(populate_store(&store, 100));
    let processor = processor_with_views(&store);
    rt.block_on(processor.run_catch_up()).unwrap();

    c.bench_function("projections/catch_up_nothing_new", |b| {
        b.iter(|| {
            rt.block_on(async {
                processor.run_catch_up().await.unwrap();
            });
        });
    });
}

fn bench_register_totals(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    rt.block_on(populate_store(&store, 100));
    let register = CashRegisterView::new();
    let mut processor = ProjectionProcessor::new(store.clone());
    processor.register(Box::new(register.clone()));
    rt.block_on(processor.run_catch_up()).unwrap();

    c.bench_function("projections/register_totals_by_method", |b| {
        b.iter(|| {
            rt.block_on(async {
                std::hint::black_box(register.totals_by_method().await);
            });
        });
    });
}

criterion_group!(
    benches,
    bench_catch_up_100_orders,
    bench_incremental_catch_up,
    bench_register_totals,
);
criterion_main!(benches);
