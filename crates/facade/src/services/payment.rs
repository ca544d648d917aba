//! Payment gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use common::{Money, OrderId};
use serde::{Deserialize, Serialize};

use crate::config::PaymentConfig;
use crate::error::ServiceError;

/// Payment progress for a single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// A charge is in flight.
    Pending,
    /// The order has been charged.
    Success,
    /// Every charge attempt was declined.
    Failed,
}

/// Trait for payment processing operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges `amount` for an order, retrying declined attempts up to the
    /// gateway's attempt budget.
    async fn process_payment(&self, order_id: &OrderId, amount: Money) -> Result<(), ServiceError>;

    /// Refunds `amount`. Refunds are not linked back to an order.
    async fn refund_payment(&self, amount: Money) -> Result<(), ServiceError>;

    /// Returns the payment record for an order, if processing ever started.
    fn payment_status(&self, order_id: &OrderId) -> Option<PaymentStatus>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    payments: HashMap<OrderId, PaymentStatus>,
    refunds: Vec<Money>,
    charge_attempts: u32,
    decline_all: bool,
    fail_on_refund: bool,
    network_failure: Option<String>,
}

/// In-memory payment gateway that simulates network latency.
///
/// A charge attempt succeeds iff the amount is positive, so retries never
/// change the outcome for a given amount.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryPaymentState>>,
    config: PaymentConfig,
}

impl InMemoryPaymentGateway {
    /// Creates a gateway with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway with the given settings.
    pub fn with_config(config: PaymentConfig) -> Self {
        Self {
            state: Arc::default(),
            config,
        }
    }

    /// Configures the gateway to decline every charge attempt.
    pub fn set_decline_all(&self, decline: bool) {
        self.write().decline_all = decline;
    }

    /// Configures the gateway to refuse refunds.
    pub fn set_fail_on_refund(&self, fail: bool) {
        self.write().fail_on_refund = fail;
    }

    /// Makes every subsequent call fail with a network error carrying `message`.
    pub fn set_network_failure(&self, message: Option<&str>) {
        self.write().network_failure = message.map(str::to_string);
    }

    /// Returns the total number of charge attempts made.
    pub fn charge_attempts(&self) -> u32 {
        self.read().charge_attempts
    }

    /// Returns the amounts refunded so far, in order.
    pub fn refunds(&self) -> Vec<Money> {
        self.read().refunds.clone()
    }

    /// Returns the number of refunds issued.
    pub fn refund_count(&self) -> usize {
        self.read().refunds.len()
    }

    fn network_failure(&self) -> Option<ServiceError> {
        self.read().network_failure.clone().map(ServiceError::Network)
    }

    fn set_status(&self, order_id: &OrderId, status: PaymentStatus) {
        self.write().payments.insert(order_id.clone(), status);
    }

    async fn attempt_charge(&self, amount: Money) -> bool {
        tokio::time::sleep(self.config.charge_latency).await;
        let mut state = self.write();
        state.charge_attempts += 1;
        amount.is_positive() && !state.decline_all
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryPaymentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryPaymentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn process_payment(&self, order_id: &OrderId, amount: Money) -> Result<(), ServiceError> {
        self.set_status(order_id, PaymentStatus::Pending);

        if let Some(err) = self.network_failure() {
            self.set_status(order_id, PaymentStatus::Failed);
            return Err(err);
        }

        for attempt in 1..=self.config.max_attempts {
            metrics::counter!("payment_attempts_total").increment(1);
            if self.attempt_charge(amount).await {
                self.set_status(order_id, PaymentStatus::Success);
                tracing::info!(%order_id, %amount, attempt, "payment succeeded");
                return Ok(());
            }
            tracing::warn!(%order_id, %amount, attempt, "payment attempt failed");
        }

        self.set_status(order_id, PaymentStatus::Failed);
        Err(ServiceError::Rejected(format!(
            "Payment of {amount} declined after {} attempts",
            self.config.max_attempts
        )))
    }

    async fn refund_payment(&self, amount: Money) -> Result<(), ServiceError> {
        if let Some(err) = self.network_failure() {
            return Err(err);
        }

        tokio::time::sleep(self.config.refund_latency).await;

        let mut state = self.write();
        if state.fail_on_refund {
            return Err(ServiceError::Rejected("Refund declined".to_string()));
        }
        state.refunds.push(amount);
        metrics::counter!("refunds_total").increment(1);
        tracing::info!(%amount, "refund processed");
        Ok(())
    }

    fn payment_status(&self, order_id: &OrderId) -> Option<PaymentStatus> {
        self.read().payments.get(order_id).copied()
    }
}
