//! Collaborators coordinated by the facade, with in-memory simulations.

pub mod inventory;
pub mod payment;
pub mod shipping;

pub use inventory::{InventoryLedger, StockLevel};
pub use payment::{InMemoryPaymentGateway, PaymentGateway, PaymentStatus};
pub use shipping::{InMemoryShippingService, ShipmentResult, ShippingService};
