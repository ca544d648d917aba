//! Order facade coordinating inventory, payment and shipping.

use std::time::Instant;

use common::OrderId;

use crate::config::FacadeConfig;
use crate::error::{OrderError, Result, ServiceError};
use crate::order::Order;
use crate::registry::{OrderRegistry, Settler};
use crate::services::inventory::InventoryLedger;
use crate::services::payment::{InMemoryPaymentGateway, PaymentGateway, PaymentStatus};
use crate::services::shipping::{InMemoryShippingService, ShipmentResult, ShippingService};
use crate::status::{OrderState, OrderStatus};

pub const ITEM_NOT_AVAILABLE: &str = "Item not available";
pub const PAYMENT_PLATFORM_UNAVAILABLE: &str = "Payment platform unavailable";
pub const SHIPPING_FAILED: &str = "Shipping failed";
pub const SHIPMENT_CANCELLATION_FAILED: &str = "Shipment cancellation failed.";
pub const REFUND_FAILED: &str = "Refund failed.";
pub const ORDER_COMPLETED: &str = "Order completed successfully";

/// Points in `place_order` where a pending cancellation is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    BeforeInventory,
    BeforePayment,
    BeforeShipping,
}

impl Checkpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Checkpoint::BeforeInventory => "before_inventory",
            Checkpoint::BeforePayment => "before_payment",
            Checkpoint::BeforeShipping => "before_shipping",
        }
    }
}

enum Placement {
    Completed(ShipmentResult),
    Canceled(Checkpoint),
}

/// Side effects taken by one `place_order` call.
#[derive(Debug, Default)]
struct Progress {
    inventory_locked: bool,
}

/// Single entry point for placing and canceling orders.
///
/// `place_order` drives lock → pay → ship, checking for cancellation before
/// each step and rolling back on failure. `cancel_order` may run concurrently
/// with it; the two only meet through the order registry, so a cancellation
/// takes effect at the next checkpoint and never interrupts a call already in
/// flight. Whichever side compensates or records the final status claims the
/// order first, so an order is refunded and unlocked at most once.
pub struct OrderFacade<P, S>
where
    P: PaymentGateway,
    S: ShippingService,
{
    inventory: InventoryLedger,
    payment: P,
    shipping: S,
    registry: OrderRegistry,
}

impl OrderFacade<InMemoryPaymentGateway, InMemoryShippingService> {
    /// Creates a facade over the default catalogue and simulated collaborators.
    pub fn in_memory(config: &FacadeConfig) -> Self {
        Self::new(
            InventoryLedger::default(),
            InMemoryPaymentGateway::with_config(config.payment.clone()),
            InMemoryShippingService::with_config(config.shipping.clone()),
        )
    }
}

impl<P, S> OrderFacade<P, S>
where
    P: PaymentGateway,
    S: ShippingService,
{
    pub fn new(inventory: InventoryLedger, payment: P, shipping: S) -> Self {
        Self {
            inventory,
            payment,
            shipping,
            registry: OrderRegistry::new(),
        }
    }

    pub fn inventory(&self) -> &InventoryLedger {
        &self.inventory
    }

    pub fn payment(&self) -> &P {
        &self.payment
    }

    pub fn shipping(&self) -> &S {
        &self.shipping
    }

    /// Returns the latest status record of an order.
    pub fn order_status(&self, order_id: &OrderId) -> Option<OrderStatus> {
        self.registry.status(order_id)
    }

    /// Returns an order that has not yet settled.
    pub fn active_order(&self, order_id: &OrderId) -> Option<Order> {
        self.registry.active(order_id)
    }

    pub fn active_order_count(&self) -> usize {
        self.registry.active_count()
    }

    /// Places an order.
    ///
    /// Returns `Ok(true)` once the order is completed and `Ok(false)` if it was
    /// canceled or failed for a recognized reason; the status record carries
    /// the reason. Network faults are rolled back like any other failure and
    /// then returned as `Err`, as are malformed or duplicate orders.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id, item = %order.item, quantity = order.quantity))]
    pub async fn place_order(&self, order: Order) -> Result<bool> {
        order.validate()?;
        self.registry.register(order.clone())?;
        metrics::counter!("orders_placed_total").increment(1);
        let started = Instant::now();

        let mut progress = Progress::default();
        let outcome = self.run_placement(&order, &mut progress).await;
        metrics::histogram!("order_placement_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(Placement::Completed(shipment)) => {
                if !self.registry.claim(&order.id, Settler::Placement) {
                    tracing::warn!(
                        tracking_number = %shipment.tracking_number,
                        "order canceled during shipping; not marking completed"
                    );
                    return Ok(false);
                }
                self.registry
                    .transition(&order.id, OrderStatus::completed(ORDER_COMPLETED));
                self.registry.retire(&order.id);
                self.registry.release(&order.id);
                metrics::counter!("orders_completed_total").increment(1);
                tracing::info!(tracking_number = %shipment.tracking_number, "order placed successfully");
                Ok(true)
            }
            Ok(Placement::Canceled(checkpoint)) => {
                tracing::info!(checkpoint = checkpoint.as_str(), "order was canceled");
                Ok(false)
            }
            Err(err) => {
                self.roll_back(&order, &progress, &err).await;
                if err.is_fault() { Err(err) } else { Ok(false) }
            }
        }
    }

    /// Cancels an order that has not yet settled.
    ///
    /// Returns `Ok(false)` if the order is unknown, already settled or being
    /// settled by `place_order`, or a compensating call was refused; in the
    /// last case the status becomes `cancel_failed` and the cancellation may
    /// be retried.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<bool> {
        let Some(order) = self.registry.active(order_id) else {
            tracing::warn!("cancel failed: order not found");
            return Ok(false);
        };

        let current = self.registry.state(order_id).unwrap_or_default();
        if current == OrderState::Completed {
            tracing::info!("cancel failed: order already completed");
            return Ok(false);
        }

        if !self.registry.claim(order_id, Settler::Cancellation) {
            tracing::info!("cancel failed: order is already settling");
            return Ok(false);
        }

        if let Err(err) = self.undo_for_cancel(&order, current).await {
            tracing::warn!(error = %err, kind = err.kind(), "cancel failed");
            metrics::counter!("order_cancel_failures_total").increment(1);
            self.registry
                .transition(order_id, OrderStatus::cancel_failed(err.to_string()));
            self.registry.release(order_id);
            return if err.is_fault() { Err(err) } else { Ok(false) };
        }

        // only the claim holder writes a final status, so this cannot be refused
        let canceled = self.registry.transition(order_id, OrderStatus::canceled());
        if canceled {
            if let Err(e) = self.inventory.unlock_item(&order.item, order.quantity) {
                tracing::warn!(error = %e, "inventory was not locked for canceled order");
            }
            self.registry.retire(order_id);
            metrics::counter!("orders_canceled_total").increment(1);
            tracing::info!("order canceled successfully");
        }
        self.registry.release(order_id);
        Ok(canceled)
    }

    async fn run_placement(&self, order: &Order, progress: &mut Progress) -> Result<Placement> {
        if self.registry.cancel_requested(&order.id) {
            return Ok(Placement::Canceled(Checkpoint::BeforeInventory));
        }

        self.inventory
            .lock_item(&order.item, order.quantity)
            .map_err(|e| {
                tracing::debug!(error = %e, "inventory lock refused");
                OrderError::InventoryUnavailable(ITEM_NOT_AVAILABLE.to_string())
            })?;
        progress.inventory_locked = true;

        if self.registry.cancel_requested(&order.id) {
            return Ok(Placement::Canceled(Checkpoint::BeforePayment));
        }

        self.payment
            .process_payment(&order.id, order.payment_amount)
            .await
            .map_err(|e| match e {
                ServiceError::Rejected(reason) => {
                    tracing::debug!(%reason, "payment declined");
                    OrderError::PaymentPlatform(PAYMENT_PLATFORM_UNAVAILABLE.to_string())
                }
                ServiceError::Network(msg) => OrderError::Network(msg),
            })?;

        if self.registry.cancel_requested(&order.id) {
            return Ok(Placement::Canceled(Checkpoint::BeforeShipping));
        }

        let shipment = self
            .shipping
            .ship_item(&order.item, order.quantity, &order.shipping_address)
            .await
            .map_err(|e| match e {
                ServiceError::Rejected(reason) => {
                    tracing::debug!(%reason, "shipment refused");
                    OrderError::Shipping(SHIPPING_FAILED.to_string())
                }
                ServiceError::Network(msg) => OrderError::Network(msg),
            })?;

        Ok(Placement::Completed(shipment))
    }

    /// Refunds before unlocking, then records the failure.
    async fn roll_back(&self, order: &Order, progress: &Progress, err: &OrderError) {
        tracing::warn!(error = %err, kind = err.kind(), "order failed");
        metrics::counter!("orders_failed_total", "reason" => err.kind()).increment(1);

        // cancel_order has compensated, or is compensating, for this order
        if !self.registry.claim(&order.id, Settler::Placement) {
            tracing::info!("order canceled during placement; skipping rollback");
            return;
        }

        if self.payment.payment_status(&order.id) == Some(PaymentStatus::Success)
            && let Err(e) = self.payment.refund_payment(order.payment_amount).await
        {
            tracing::error!(error = %e, amount = %order.payment_amount, "refund during rollback failed");
        }

        if progress.inventory_locked
            && let Err(e) = self.inventory.unlock_item(&order.item, order.quantity)
        {
            tracing::error!(error = %e, "failed to release inventory lock");
        }

        self.registry
            .transition(&order.id, OrderStatus::failed(err.to_string()));
        self.registry.retire(&order.id);
        self.registry.release(&order.id);
    }

    async fn undo_for_cancel(&self, order: &Order, current: OrderState) -> Result<()> {
        if current != OrderState::Creating {
            self.shipping
                .cancel_shipment(&order.item, order.quantity)
                .await
                .map_err(|e| match e {
                    ServiceError::Rejected(_) => {
                        OrderError::ShippingCancellation(SHIPMENT_CANCELLATION_FAILED.to_string())
                    }
                    ServiceError::Network(msg) => OrderError::Network(msg),
                })?;
        }

        if self.payment.payment_status(&order.id) == Some(PaymentStatus::Success) {
            self.payment
                .refund_payment(order.payment_amount)
                .await
                .map_err(|e| match e {
                    ServiceError::Rejected(_) => OrderError::Refund(REFUND_FAILED.to_string()),
                    ServiceError::Network(msg) => OrderError::Network(msg),
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ItemId, Money};

    type TestFacade = OrderFacade<InMemoryPaymentGateway, InMemoryShippingService>;

    fn setup() -> TestFacade {
        OrderFacade::in_memory(&FacadeConfig::default())
    }

    fn order(id: &str, item: &str, quantity: u32, dollars: i64) -> Order {
        Order::new(id, item, quantity, Money::from_dollars(dollars), "123 Main St")
    }

    #[tokio::test(start_paused = true)]
    async fn test_happy_path() {
        let facade = setup();

        let placed = facade.place_order(order("o1", "item1", 2, 100)).await.unwrap();

        assert!(placed);
        let status = facade.order_status(&OrderId::new("o1")).unwrap();
        assert_eq!(status.state, OrderState::Completed);
        assert_eq!(status.details.as_deref(), Some(ORDER_COMPLETED));
        assert!(facade.active_order(&OrderId::new("o1")).is_none());
        assert_eq!(facade.shipping().shipment_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insufficient_stock() {
        let facade = setup();

        let placed = facade.place_order(order("o2", "item2", 10, 100)).await.unwrap();

        assert!(!placed);
        let status = facade.order_status(&OrderId::new("o2")).unwrap();
        assert_eq!(status.state, OrderState::Failed);
        assert_eq!(status.error.as_deref(), Some(ITEM_NOT_AVAILABLE));
        assert_eq!(facade.payment().charge_attempts(), 0);
        assert_eq!(facade.shipping().ship_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rollback_leaves_other_locks_alone() {
        let facade = setup();
        let item = ItemId::new("item2");
        facade.inventory().lock_item(&item, 3).unwrap();

        let placed = facade.place_order(order("o1", "item2", 3, 100)).await.unwrap();

        assert!(!placed);
        assert_eq!(facade.inventory().locked(&item), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_quantity_rejected_before_registration() {
        let facade = setup();

        let result = facade.place_order(order("o1", "item1", 0, 100)).await;

        assert!(matches!(result, Err(OrderError::InvalidOrder(_))));
        assert!(facade.order_status(&OrderId::new("o1")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_id_rejected() {
        let facade = setup();
        facade.place_order(order("o1", "item1", 1, 100)).await.unwrap();

        let result = facade.place_order(order("o1", "item1", 1, 100)).await;

        assert!(matches!(result, Err(OrderError::DuplicateOrder(_))));
        let status = facade.order_status(&OrderId::new("o1")).unwrap();
        assert_eq!(status.state, OrderState::Completed);
        assert_eq!(facade.inventory().locked(&ItemId::new("item1")), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unknown_order() {
        let facade = setup();
        assert!(!facade.cancel_order(&OrderId::new("ghost")).await.unwrap());
    }

    #[test]
    fn test_checkpoint_names() {
        assert_eq!(Checkpoint::BeforeInventory.as_str(), "before_inventory");
        assert_eq!(Checkpoint::BeforePayment.as_str(), "before_payment");
        assert_eq!(Checkpoint::BeforeShipping.as_str(), "before_shipping");
    }
}
