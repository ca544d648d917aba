//! Order lifecycle states and status records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Creating ──┬──► Completed
///            ├──► Failed
///            ├──► Canceled
///            └──► CancelFailed ──► (Canceled | CancelFailed | Completed | Failed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// The order is being placed.
    #[default]
    Creating,

    /// Inventory locked, payment taken and shipment dispatched (terminal state).
    Completed,

    /// Placement failed and was rolled back.
    Failed,

    /// The order was canceled (terminal state).
    Canceled,

    /// A cancellation attempt failed; cancellation may be retried.
    CancelFailed,
}

impl OrderState {
    /// Returns true if no further transition is expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Completed | OrderState::Canceled)
    }

    /// Returns true if the state accepts a transition to `next`.
    pub fn can_transition_to(&self, next: OrderState) -> bool {
        match self {
            OrderState::Creating | OrderState::CancelFailed => next != OrderState::Creating,
            OrderState::Completed | OrderState::Failed | OrderState::Canceled => false,
        }
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Creating => "creating",
            OrderState::Completed => "completed",
            OrderState::Failed => "failed",
            OrderState::Canceled => "canceled",
            OrderState::CancelFailed => "cancel_failed",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The current status of an order. Overwritten on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    #[serde(rename = "status")]
    pub state: OrderState,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrderStatus {
    fn at_now(state: OrderState) -> Self {
        Self {
            state,
            timestamp: Utc::now(),
            details: None,
            error: None,
        }
    }

    pub fn creating() -> Self {
        Self::at_now(OrderState::Creating)
    }

    pub fn completed(details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::at_now(OrderState::Completed)
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::at_now(OrderState::Failed)
        }
    }

    pub fn canceled() -> Self {
        Self::at_now(OrderState::Canceled)
    }

    pub fn cancel_failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::at_now(OrderState::CancelFailed)
        }
    }
}
