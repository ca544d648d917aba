//! Shipping service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use common::ItemId;

use crate::config::ShippingConfig;
use crate::error::ServiceError;

/// Result of a successful shipment creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentResult {
    /// The tracking number assigned by the carrier.
    pub tracking_number: String,
}

/// Trait for shipping operations.
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Dispatches `quantity` units of `item` to `address`.
    async fn ship_item(
        &self,
        item: &ItemId,
        quantity: u32,
        address: &str,
    ) -> Result<ShipmentResult, ServiceError>;

    /// Asks the carrier to cancel a shipment of `quantity` units of `item`.
    async fn cancel_shipment(&self, item: &ItemId, quantity: u32) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone)]
struct Shipment {
    item: ItemId,
    quantity: u32,
}

#[derive(Debug, Default)]
struct InMemoryShippingState {
    shipments: HashMap<String, Shipment>,
    next_id: u32,
    ship_calls: u32,
    cancellations: u32,
    fail_on_ship: bool,
    fail_on_cancel: bool,
    network_failure: Option<String>,
}

/// In-memory shipping service that simulates carrier latency.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShippingService {
    state: Arc<RwLock<InMemoryShippingState>>,
    config: ShippingConfig,
}

impl InMemoryShippingService {
    /// Creates a shipping service with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shipping service with the given settings.
    pub fn with_config(config: ShippingConfig) -> Self {
        Self {
            state: Arc::default(),
            config,
        }
    }

    /// Configures the service to refuse shipments.
    pub fn set_fail_on_ship(&self, fail: bool) {
        self.write().fail_on_ship = fail;
    }

    /// Configures the service to refuse cancellations.
    pub fn set_fail_on_cancel(&self, fail: bool) {
        self.write().fail_on_cancel = fail;
    }

    /// Makes every subsequent call fail with a network error carrying `message`.
    pub fn set_network_failure(&self, message: Option<&str>) {
        self.write().network_failure = message.map(str::to_string);
    }

    /// Returns the number of `ship_item` calls received.
    pub fn ship_calls(&self) -> u32 {
        self.read().ship_calls
    }

    /// Returns the number of shipments dispatched and not canceled.
    pub fn shipment_count(&self) -> usize {
        self.read().shipments.len()
    }

    /// Returns the number of successful cancellations.
    pub fn cancellation_count(&self) -> u32 {
        self.read().cancellations
    }

    /// Returns true if a shipment exists with the given tracking number.
    pub fn has_shipment(&self, tracking_number: &str) -> bool {
        self.read().shipments.contains_key(tracking_number)
    }

    fn network_failure(&self) -> Option<ServiceError> {
        self.read().network_failure.clone().map(ServiceError::Network)
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryShippingState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryShippingState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ShippingService for InMemoryShippingService {
    async fn ship_item(
        &self,
        item: &ItemId,
        quantity: u32,
        address: &str,
    ) -> Result<ShipmentResult, ServiceError> {
        self.write().ship_calls += 1;
        if let Some(err) = self.network_failure() {
            return Err(err);
        }

        tokio::time::sleep(self.config.ship_latency).await;

        let mut state = self.write();
        if state.fail_on_ship {
            return Err(ServiceError::Rejected("Shipping unavailable".to_string()));
        }

        state.next_id += 1;
        let tracking_number = format!("TRACK-{:04}", state.next_id);
        state.shipments.insert(
            tracking_number.clone(),
            Shipment {
                item: item.clone(),
                quantity,
            },
        );
        tracing::info!(%item, quantity, address, %tracking_number, "shipment dispatched");

        Ok(ShipmentResult { tracking_number })
    }

    async fn cancel_shipment(&self, item: &ItemId, quantity: u32) -> Result<(), ServiceError> {
        if let Some(err) = self.network_failure() {
            return Err(err);
        }

        tokio::time::sleep(self.config.cancel_latency).await;

        let mut state = self.write();
        if state.fail_on_cancel {
            return Err(ServiceError::Rejected(
                "Carrier refused cancellation".to_string(),
            ));
        }

        let matching = state
            .shipments
            .iter()
            .find(|(_, s)| &s.item == item && s.quantity == quantity)
            .map(|(tracking, _)| tracking.clone());
        if let Some(tracking_number) = matching {
            state.shipments.remove(&tracking_number);
        }
        state.cancellations += 1;
        tracing::info!(%item, quantity, "shipment canceled");
        Ok(())
    }
}
