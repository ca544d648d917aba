//! Facade over inventory, payment and shipping for single-item orders.
//!
//! `OrderFacade::place_order` follows these steps:
//! 1. Lock inventory
//! 2. Process payment
//! 3. Ship the item
//!
//! A pending cancellation is checked before each step. If a step fails, the
//! payment is refunded (when it went through) and the inventory lock released.
//! A concurrent `cancel_order` and the placement's own rollback never both
//! compensate the same order: each claims it in the registry first.

pub mod config;
pub mod error;
pub mod facade;
pub mod order;
pub mod registry;
pub mod services;
pub mod status;

pub use config::{FacadeConfig, PaymentConfig, ShippingConfig};
pub use error::{InventoryError, OrderError, Result, ServiceError};
pub use facade::{Checkpoint, OrderFacade};
pub use order::Order;
pub use registry::{OrderRegistry, Settler};
pub use services::{
    InMemoryPaymentGateway, InMemoryShippingService, InventoryLedger, PaymentGateway,
    PaymentStatus, ShipmentResult, ShippingService, StockLevel,
};
pub use status::{OrderState, OrderStatus};
