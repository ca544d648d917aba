use common::{Money, OrderId};
use criterion::{Criterion, criterion_group, criterion_main};
use order_facade::{FacadeConfig, InventoryLedger, Order, OrderFacade};

fn bench_place_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let facade = OrderFacade::in_memory(&FacadeConfig::immediate());
    facade.inventory().set_stock("SKU-BENCH", u32::MAX);

    c.bench_function("facade/place_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                let order = Order::new(
                    OrderId::random(),
                    "SKU-BENCH",
                    1,
                    Money::from_dollars(10),
                    "1 Bench Way",
                );
                facade.place_order(order).await.unwrap();
            });
        });
    });
}

fn bench_lock_unlock(c: &mut Criterion) {
    let ledger = InventoryLedger::with_stock([("SKU-BENCH", 1_000)]);
    let item = "SKU-BENCH".into();

    c.bench_function("inventory/lock_unlock", |b| {
        b.iter(|| {
            ledger.lock_item(&item, 1).unwrap();
            ledger.unlock_item(&item, 1).unwrap();
        });
    });
}

fn bench_declined_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let facade = OrderFacade::in_memory(&FacadeConfig::immediate());

    c.bench_function("facade/place_order_declined", |b| {
        b.iter(|| {
            rt.block_on(async {
                let order = Order::new(OrderId::random(), "item1", 1, Money::zero(), "Nowhere");
                let placed = facade.place_order(order).await.unwrap();
                assert!(!placed);
            });
        });
    });
}

criterion_group!(
    benches,
    bench_place_order,
    bench_lock_unlock,
    bench_declined_order
);
criterion_main!(benches);
