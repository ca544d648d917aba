//! Active-order and status indexes owned by a facade instance.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::OrderId;

use crate::error::OrderError;
use crate::order::Order;
use crate::status::{OrderState, OrderStatus};

/// Side currently running compensations or the final write for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settler {
    /// `place_order` recording completion or rolling back.
    Placement,
    /// `cancel_order` undoing the order's side effects.
    Cancellation,
}

#[derive(Debug, Default)]
struct RegistryState {
    active: HashMap<OrderId, Order>,
    statuses: HashMap<OrderId, OrderStatus>,
    claims: HashMap<OrderId, Settler>,
}

/// Keyed store of in-flight orders and their latest status.
///
/// Orders leave the active index once they settle; status records are kept
/// for the lifetime of the registry. The lock is never held across an await,
/// so code that compensates across awaits first takes a claim on the order
/// and only one claim can be held at a time.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    state: RwLock<RegistryState>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `creating` and adds the order to the active index.
    ///
    /// Fails if the order ID has been seen before.
    pub fn register(&self, order: Order) -> Result<(), OrderError> {
        let mut state = self.write();
        if state.statuses.contains_key(&order.id) {
            return Err(OrderError::DuplicateOrder(order.id));
        }
        state
            .statuses
            .insert(order.id.clone(), OrderStatus::creating());
        state.active.insert(order.id.clone(), order);
        Ok(())
    }

    /// Overwrites the status of an order if its current state allows it.
    ///
    /// Returns false and leaves the record untouched otherwise.
    pub fn transition(&self, order_id: &OrderId, next: OrderStatus) -> bool {
        let mut state = self.write();
        let current = state.statuses.get(order_id).map(|s| s.state);

        match current {
            Some(from) if from.can_transition_to(next.state) => {
                tracing::debug!(%order_id, %from, to = %next.state, "order status changed");
                state.statuses.insert(order_id.clone(), next);
                true
            }
            Some(from) => {
                tracing::warn!(%order_id, %from, to = %next.state, "rejected order status change");
                false
            }
            None => {
                tracing::warn!(%order_id, to = %next.state, "status change for unknown order");
                false
            }
        }
    }

    /// Removes an order from the active index.
    pub fn retire(&self, order_id: &OrderId) -> Option<Order> {
        self.write().active.remove(order_id)
    }

    /// Returns the latest status record of an order.
    pub fn status(&self, order_id: &OrderId) -> Option<OrderStatus> {
        self.read().statuses.get(order_id).cloned()
    }

    /// Returns the current state of an order.
    pub fn state(&self, order_id: &OrderId) -> Option<OrderState> {
        self.read().statuses.get(order_id).map(|s| s.state)
    }

    /// Returns true if the order has been canceled.
    pub fn is_canceled(&self, order_id: &OrderId) -> bool {
        self.state(order_id) == Some(OrderState::Canceled)
    }

    /// Returns true if the order is canceled or a cancellation is under way.
    pub fn cancel_requested(&self, order_id: &OrderId) -> bool {
        let state = self.read();
        state.claims.get(order_id) == Some(&Settler::Cancellation)
            || state.statuses.get(order_id).map(|s| s.state) == Some(OrderState::Canceled)
    }

    /// Takes the exclusive right to settle an order.
    ///
    /// Fails if another claim is held, or if the order is unknown or already
    /// `completed`, `failed` or `canceled`.
    pub fn claim(&self, order_id: &OrderId, settler: Settler) -> bool {
        let mut state = self.write();
        if let Some(holder) = state.claims.get(order_id) {
            tracing::debug!(%order_id, ?holder, ?settler, "order already claimed");
            return false;
        }
        let open = state
            .statuses
            .get(order_id)
            .is_some_and(|s| matches!(s.state, OrderState::Creating | OrderState::CancelFailed));
        if !open {
            tracing::debug!(%order_id, ?settler, "order already settled");
            return false;
        }
        state.claims.insert(order_id.clone(), settler);
        true
    }

    /// Drops the claim on an order.
    pub fn release(&self, order_id: &OrderId) {
        self.write().claims.remove(order_id);
    }

    /// Returns an order from the active index.
    pub fn active(&self, order_id: &OrderId) -> Option<Order> {
        self.read().active.get(order_id).cloned()
    }

    pub fn active_count(&self) -> usize {
        self.read().active.len()
    }

    pub fn status_count(&self) -> usize {
        self.read().statuses.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
