use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-assigned identifier for an order.
///
/// Ids are opaque strings; the facade only requires that each one is used
/// once for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates an order ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a random order ID for callers that do not assign their own.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the order ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Inventory item identifier (SKU).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an item ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the item ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount represented in cents to avoid floating point issues.
///
/// Amounts may be zero or negative; it is up to the payment gateway to decide
/// whether such an amount can be charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole dollar value.
    pub fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_random_creates_unique_ids() {
        let id1 = OrderId::random();
        let id2 = OrderId::random();
        assert_ne!(id1, id2);
    }

    #[test]
    fn order_id_serializes_as_plain_string() {
        let id = OrderId::new("o1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"o1\"");
    }

    #[test]
    fn item_id_conversions() {
        let a: ItemId = "item1".into();
        let b = ItemId::new(String::from("item1"));
        assert_eq!(a, b);
        assert_eq!(a.as_ref(), "item1");
        assert_eq!(a.to_string(), "item1");
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_dollars(100).to_string(), "$100.00");
        assert_eq!(Money::from_cents(1005).to_string(), "$10.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-$2.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn money_positivity() {
        assert!(Money::from_cents(1).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(!Money::from_cents(-100).is_positive());
    }

    #[test]
    fn money_sum() {
        let total: Money = [Money::from_cents(150), Money::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(400));
    }
}
