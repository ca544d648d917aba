//! Simulation settings for the collaborators, loaded from environment variables.

use std::time::Duration;

/// Payment gateway settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfig {
    /// Maximum charge attempts per order.
    pub max_attempts: u32,
    /// Simulated latency of a single charge attempt.
    pub charge_latency: Duration,
    /// Simulated latency of a refund.
    pub refund_latency: Duration,
}

impl PaymentConfig {
    /// Settings with no simulated latency, for benchmarks.
    pub fn immediate() -> Self {
        Self {
            charge_latency: Duration::ZERO,
            refund_latency: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            charge_latency: Duration::from_millis(1000),
            refund_latency: Duration::from_millis(500),
        }
    }
}

/// Shipping service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingConfig {
    /// Simulated carrier dispatch latency.
    pub ship_latency: Duration,
    /// Simulated cancellation latency.
    pub cancel_latency: Duration,
}

impl ShippingConfig {
    /// Settings with no simulated latency, for benchmarks.
    pub fn immediate() -> Self {
        Self {
            ship_latency: Duration::ZERO,
            cancel_latency: Duration::ZERO,
        }
    }
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            ship_latency: Duration::from_millis(1000),
            cancel_latency: Duration::from_millis(500),
        }
    }
}

/// Collaborator settings with sensible defaults.
///
/// Reads from environment variables:
/// - `PAYMENT_MAX_ATTEMPTS` — charge attempts per order (default: `3`)
/// - `PAYMENT_LATENCY_MS` — latency per charge attempt (default: `1000`)
/// - `REFUND_LATENCY_MS` — refund latency (default: `500`)
/// - `SHIP_LATENCY_MS` — shipment latency (default: `1000`)
/// - `CANCEL_SHIPMENT_LATENCY_MS` — shipment cancellation latency (default: `500`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacadeConfig {
    pub payment: PaymentConfig,
    pub shipping: ShippingConfig,
}

impl FacadeConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            payment: PaymentConfig {
                max_attempts: lookup("PAYMENT_MAX_ATTEMPTS")
                    .and_then(|v| v.parse().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(defaults.payment.max_attempts),
                charge_latency: millis("PAYMENT_LATENCY_MS", defaults.payment.charge_latency),
                refund_latency: millis("REFUND_LATENCY_MS", defaults.payment.refund_latency),
            },
            shipping: ShippingConfig {
                ship_latency: millis("SHIP_LATENCY_MS", defaults.shipping.ship_latency),
                cancel_latency: millis(
                    "CANCEL_SHIPMENT_LATENCY_MS",
                    defaults.shipping.cancel_latency,
                ),
            },
        }
    }

    /// Settings with no simulated latency anywhere.
    pub fn immediate() -> Self {
        Self {
            payment: PaymentConfig::immediate(),
            shipping: ShippingConfig::immediate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_values() {
        let config = FacadeConfig::default();
        assert_eq!(config.payment.max_attempts, 3);
        assert_eq!(config.payment.charge_latency, Duration::from_millis(1000));
        assert_eq!(config.payment.refund_latency, Duration::from_millis(500));
        assert_eq!(config.shipping.ship_latency, Duration::from_millis(1000));
        assert_eq!(config.shipping.cancel_latency, Duration::from_millis(500));
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PAYMENT_MAX_ATTEMPTS", "5"),
            ("PAYMENT_LATENCY_MS", "10"),
            ("SHIP_LATENCY_MS", "20"),
        ]);
        let config = FacadeConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.payment.max_attempts, 5);
        assert_eq!(config.payment.charge_latency, Duration::from_millis(10));
        assert_eq!(config.payment.refund_latency, Duration::from_millis(500));
        assert_eq!(config.shipping.ship_latency, Duration::from_millis(20));
        assert_eq!(config.shipping.cancel_latency, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PAYMENT_MAX_ATTEMPTS", "0"),
            ("REFUND_LATENCY_MS", "soon"),
        ]);
        let config = FacadeConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config, FacadeConfig::default());
    }

    #[test]
    fn test_immediate_keeps_retry_budget() {
        let config = FacadeConfig::immediate();
        assert_eq!(config.payment.max_attempts, 3);
        assert_eq!(config.payment.charge_latency, Duration::ZERO);
        assert_eq!(config.shipping.ship_latency, Duration::ZERO);
    }
}
