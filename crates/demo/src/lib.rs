//! Reference order scenarios run against the in-memory facade.
//!
//! Each scenario places one or more orders and reports the outcome together
//! with the status record the facade kept for them.

pub mod config;

use common::{Money, OrderId};
use futures_util::future::join_all;
use order_facade::{
    InMemoryPaymentGateway, InMemoryShippingService, Order, OrderFacade, OrderState, OrderStatus,
};
use serde::Serialize;

pub use config::Config;

pub type DemoFacade = OrderFacade<InMemoryPaymentGateway, InMemoryShippingService>;

/// Outcome of one order placed by a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: &'static str,
    pub order_id: OrderId,
    /// `Some(true)` if placed, `Some(false)` if refused; `None` on a fault.
    pub placed: Option<bool>,
    /// Fault surfaced by `place_order`, if any.
    pub fault: Option<String>,
    pub status: Option<OrderStatus>,
}

impl ScenarioReport {
    fn new(
        facade: &DemoFacade,
        scenario: &'static str,
        order_id: OrderId,
        result: order_facade::Result<bool>,
    ) -> Self {
        let status = facade.order_status(&order_id);
        let (placed, fault) = match result {
            Ok(placed) => (Some(placed), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            scenario,
            order_id,
            placed,
            fault,
            status,
        }
    }

    /// Returns the state recorded for the order, if any.
    pub fn state(&self) -> Option<OrderState> {
        self.status.as_ref().map(|s| s.state)
    }
}

fn order(id: impl Into<OrderId>, item: &str, quantity: u32, dollars: i64, address: &str) -> Order {
    Order::new(id, item, quantity, Money::from_dollars(dollars), address)
}

/// Runs every scenario in sequence on one facade.
pub async fn run_scenarios(facade: &DemoFacade, config: &Config) -> Vec<ScenarioReport> {
    let mut reports = Vec::new();

    reports.push(place(facade, "success", order("o1", "item1", 2, 100, "Addr")).await);
    reports.push(
        place(
            facade,
            "insufficient_stock",
            order("o2", "item2", 10, 100, "Addr"),
        )
        .await,
    );
    reports.push(
        place(
            facade,
            "payment_declined",
            order("o3", "item1", 1, 0, "Addr"),
        )
        .await,
    );

    facade.shipping().set_fail_on_ship(true);
    reports.push(
        place(
            facade,
            "shipping_failure",
            order("o5", "item1", 1, 100, "123 Main St"),
        )
        .await,
    );
    facade.shipping().set_fail_on_ship(false);

    reports.push(cancel_during_payment(facade, config).await);
    reports.extend(concurrent_load(facade, config).await);

    reports
}

async fn place(facade: &DemoFacade, scenario: &'static str, order: Order) -> ScenarioReport {
    let order_id = order.id.clone();
    let result = facade.place_order(order).await;
    let report = ScenarioReport::new(facade, scenario, order_id, result);
    tracing::info!(
        scenario,
        order_id = %report.order_id,
        placed = ?report.placed,
        state = ?report.state(),
        "scenario finished"
    );
    report
}

async fn cancel_during_payment(facade: &DemoFacade, config: &Config) -> ScenarioReport {
    let order_id = OrderId::new("o4");
    let halfway = config.facade.payment.charge_latency / 2;

    let (report, canceled) = tokio::join!(
        place(
            facade,
            "cancel_during_payment",
            order(order_id.clone(), "item1", 1, 100, "123 Main St"),
        ),
        async {
            tokio::time::sleep(halfway).await;
            facade.cancel_order(&order_id).await
        }
    );
    tracing::info!(%order_id, canceled = ?canceled, "cancellation finished");
    report
}

async fn concurrent_load(facade: &DemoFacade, config: &Config) -> Vec<ScenarioReport> {
    facade
        .inventory()
        .set_stock("item-load", config.load_orders);

    let orders: Vec<Order> = (0..config.load_orders)
        .map(|i| order(OrderId::random(), "item-load", 1, 10 + i64::from(i), "Load St"))
        .collect();
    join_all(
        orders
            .into_iter()
            .map(|o| place(facade, "concurrent_load", o)),
    )
    .await
}
