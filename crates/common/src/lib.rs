//! Value types shared across the order facade crates.

pub mod types;

pub use types::{ItemId, Money, OrderId};
