//! Order requests accepted by the facade.

use common::{ItemId, Money, OrderId};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// A single-item order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub item: ItemId,
    pub quantity: u32,
    pub payment_amount: Money,
    pub shipping_address: String,
}

impl Order {
    pub fn new(
        id: impl Into<OrderId>,
        item: impl Into<ItemId>,
        quantity: u32,
        payment_amount: Money,
        shipping_address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            item: item.into(),
            quantity,
            payment_amount,
            shipping_address: shipping_address.into(),
        }
    }

    /// Checks the order before any side effect is taken.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.quantity == 0 {
            return Err(OrderError::InvalidOrder(
                "quantity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_converts_ids() {
        let order = Order::new("o1", "item1", 2, Money::from_dollars(100), "Addr");
        assert_eq!(order.id, OrderId::new("o1"));
        assert_eq!(order.item, ItemId::new("item1"));
        assert_eq!(order.shipping_address, "Addr");
    }

    #[test]
    fn test_zero_quantity_is_invalid() {
        let order = Order::new("o1", "item1", 0, Money::from_dollars(100), "Addr");
        assert!(matches!(order.validate(), Err(OrderError::InvalidOrder(_))));
    }

    #[test]
    fn test_non_positive_amount_is_left_to_the_gateway() {
        let order = Order::new("o1", "item1", 1, Money::zero(), "Addr");
        assert!(order.validate().is_ok());
    }
}
