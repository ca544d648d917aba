//! Demo configuration loaded from environment variables.

use order_facade::FacadeConfig;

/// Demo configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DEMO_LOAD_ORDERS` — orders placed concurrently in the load scenario (default: `4`)
/// - the collaborator settings documented on [`FacadeConfig`]
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub load_orders: u32,
    pub facade: FacadeConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Missing, unparsable or out-of-range values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            load_orders: lookup("DEMO_LOAD_ORDERS")
                .and_then(|n| n.parse::<u32>().ok())
                .unwrap_or(4),
            facade: FacadeConfig::from_lookup(&lookup),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            load_orders: 4,
            facade: FacadeConfig::default(),
        }
    }
}
